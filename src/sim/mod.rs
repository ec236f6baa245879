//! Player movement simulation
//!
//! Pure and deterministic: no wall-clock reads, no global state, no
//! randomness. Given the same world, input samples and timestep sequence,
//! two sessions produce bit-identical trajectories. The host owns the
//! clocks and feeds elapsed time in.

pub mod body;
pub mod friction;
pub mod ground;
pub mod horizontal;
pub mod input;
pub mod magnet;
pub mod physics;
pub mod tick;
pub mod vertical;
pub mod world;

pub use body::PlayerBody;
pub use friction::FrictionController;
pub use ground::{GroundSensor, GroundState};
pub use horizontal::HorizontalMotor;
pub use input::{InputSample, InputState};
pub use magnet::{magnet_force, modulated_max_speed, MagnetLauncher, MagnetProjectile, Polarity};
pub use tick::{Session, TickEvent};
pub use vertical::{JetpackVisual, VerticalMotor};
pub use world::{BoxCollider, LayerMask, PlatformId, RayHit, Raycaster, StageWorld, SurfaceTag};
