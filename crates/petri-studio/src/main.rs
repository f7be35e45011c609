//! Petri studio: a field sphere with a wireframe grid shell and a bacteria
//! colony growing on its surface.
//!
//! Controls: drag to orbit, wheel to zoom, `Space` pause, `P` poison,
//! `R` reset, `G` toggle grid, `Escape` quit.

mod colony;
mod stats;
mod studio;

use anyhow::Result;
use petri_engine::device::GpuInit;
use petri_engine::logging::{init_logging, LoggingConfig};
use petri_engine::window::{Runtime, RuntimeConfig};

use crate::colony::ColonySettings;
use crate::studio::{SceneSettings, Studio};

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let runtime = RuntimeConfig {
        title: "Petri".to_string(),
        ..Default::default()
    };
    let studio = Studio::new(SceneSettings::default(), ColonySettings::default())?;

    log::info!("starting petri studio");
    Runtime::run(runtime, GpuInit::default(), studio)
}
