//! Tracing subscriber for the compiler and runtime.
//!
//! Filtering comes from `ORI_LOG`, falling back to `RUST_LOG`, e.g.
//! `ORI_LOG=ori_eval=debug` or `ORI_LOG=ori_capabilities=trace`.
//! Setting `ORI_LOG_TREE` switches to indented, span-nested output.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use tracing_tree::HierarchicalLayer;

static TRACING_INIT: Once = Once::new();

pub const LOG_VAR: &str = "ORI_LOG";
pub const LOG_TREE_VAR: &str = "ORI_LOG_TREE";

/// Install the global subscriber. Later calls do nothing.
///
/// Nothing is installed when neither `ORI_LOG` nor `RUST_LOG` is set.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let Some(filter) = env_filter() else {
            return;
        };
        let tree = std::env::var_os(LOG_TREE_VAR).is_some();

        let hierarchical = tree.then(|| {
            HierarchicalLayer::new(2)
                .with_targets(true)
                .with_bracketed_fields(true)
        });
        let plain = (!tree).then(|| fmt::layer().with_target(true).with_level(true));

        // Another subscriber (e.g. a test harness) may already be installed.
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(hierarchical)
            .with(plain)
            .try_init();
    });
}

fn env_filter() -> Option<EnvFilter> {
    let directives = std::env::var(LOG_VAR)
        .or_else(|_| std::env::var("RUST_LOG"))
        .ok()?;
    Some(EnvFilter::new(directives))
}
