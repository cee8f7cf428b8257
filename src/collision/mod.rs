pub mod boundary;
pub mod detector;
pub use boundary::{Boundaries, Boundary, HeadVolume};
pub use detector::check_collisions_system;
pub use detector::{Collision, CollisionDetector};
