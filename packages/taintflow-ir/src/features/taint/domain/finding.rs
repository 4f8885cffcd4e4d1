//! Findings and witness paths

use serde::{Deserialize, Serialize};

use crate::features::call_graph::domain::CallSiteRef;

/// One source-to-sink flow the analysis proved possible
///
/// The witness path is the ordered list of call sites the fact crossed:
/// it begins at the source call site, ends at the sink call site, and lists
/// every interprocedural call site crossed in between. Same-function flows
/// have the two-entry path source-site -> sink-site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub source: CallSiteRef,
    pub sink: CallSiteRef,
    /// Qualified symbol the source entry matched
    pub source_symbol: String,
    /// Qualified symbol the sink entry matched
    pub sink_symbol: String,
    pub path: Vec<CallSiteRef>,
}

impl Finding {
    pub fn new(
        source: CallSiteRef,
        sink: CallSiteRef,
        source_symbol: impl Into<String>,
        sink_symbol: impl Into<String>,
        path: Vec<CallSiteRef>,
    ) -> Self {
        Self {
            source,
            sink,
            source_symbol: source_symbol.into(),
            sink_symbol: sink_symbol.into(),
            path,
        }
    }
}

impl std::fmt::Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} at {} -> {} at {} (path: ",
            self.source_symbol, self.source, self.sink_symbol, self.sink
        )?;
        for (i, site) in self.path.iter().enumerate() {
            if i > 0 {
                write!(f, " -> ")?;
            }
            write!(f, "{}", site)?;
        }
        write!(f, ")")
    }
}
