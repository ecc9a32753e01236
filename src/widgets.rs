pub mod legend;
pub mod pcp;
pub mod quality;
pub mod scatter;

pub use legend::ClusterLegend;
pub use pcp::ParallelCoords;
pub use quality::QualityBars;
pub use scatter::{PointScatter, VariableScatter};
