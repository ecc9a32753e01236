use std::sync::Arc;

use clusterlens::{Explorer, FixtureService};

fn main() -> eframe::Result {
    env_logger::init();

    let service = FixtureService::new()
        .with(
            "/data/mds-points",
            include_str!("../../../assets/data/mds-points.json"),
        )
        .with(
            "/data/mds-variables",
            include_str!("../../../assets/data/mds-variables.json"),
        )
        .with(
            "/data/kmeans-mse",
            include_str!("../../../assets/data/kmeans-mse.json"),
        )
        .with(
            "/data/pcp-data",
            include_str!("../../../assets/data/pcp-data.json"),
        );

    Explorer::new(Arc::new(service)).run("clusterlens explorer")
}
