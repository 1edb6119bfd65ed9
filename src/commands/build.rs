//! Build the site

use anyhow::Result;

use crate::content::ContentLoader;
use crate::generator::{BuildSummary, Generator};
use crate::Site;

/// Load content, render every record and copy passthrough directories
pub fn run(site: &Site) -> Result<BuildSummary> {
    let start = std::time::Instant::now();

    let records = ContentLoader::new(site).load_records()?;
    tracing::info!("Loaded {} records from {:?}", records.len(), site.input_dir);

    let mut generator = Generator::new(site)?;
    let summary = generator.generate(&records)?;

    let duration = start.elapsed();
    tracing::info!(
        "Wrote {} pages, copied {} files in {:.2}s",
        summary.written,
        summary.copied,
        duration.as_secs_f64()
    );

    Ok(summary)
}
