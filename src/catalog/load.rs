use super::{Catalog, LoadCatalogProblem};
use anyhow::{bail, Result};
use tracing::{info, warn};

pub fn load_catalog<P: AsRef<std::path::Path>>(path: P) -> Result<Catalog> {
    let path = path.as_ref();
    info!("Loading song catalog from {}...", path.display());
    let catalog_result = Catalog::build(path);
    let problems = catalog_result.problems;
    let catalog = catalog_result.catalog;

    if !problems.is_empty() {
        warn!("Found {} problems:", problems.len());
        for problem in problems.iter() {
            warn!("- {:?}", problem);
        }
    }

    match (&catalog, problems.is_empty()) {
        (Some(_), true) => info!("Catalog checked, no issues found."),
        (Some(_), false) => info!(
            "Catalog was built, but check the {} non-fatal issues above.",
            problems.len()
        ),
        (None, _) => {
            let fatal = problems.iter().filter(|p| p.is_fatal()).count();
            info!(
                "Check the problems above, {} of them prevented the catalog from loading.",
                fatal
            )
        }
    }

    if let Some(catalog) = catalog {
        info!("Catalog has {} songs:", catalog.len());
        for entry in catalog.emotions() {
            info!("  {}: {}", entry.emotion, entry.songs);
        }
        return Ok(catalog);
    }

    match problems.into_iter().find(LoadCatalogProblem::is_fatal) {
        Some(problem) => bail!("Could not load catalog: {:?}", problem),
        None => bail!("Could not load catalog"),
    }
}
