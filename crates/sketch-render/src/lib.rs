pub mod coords;
pub mod hit;
pub mod svg;

pub use hit::{HitTestConfig, hit_node, hit_object, hit_segment};
pub use svg::export_svg;
