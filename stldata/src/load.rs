use crate::extract::{ExtractionError, extract};
use crate::quotas::Quotas;
use crate::set::PropertySet;
use rayon::prelude::*;
use stltxt::{Node, ParseError, parse_document};

/// A source text that could not be parsed and was left out.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFailure {
    /// Position of the source in the input list.
    pub index: usize,
    pub error: ParseError,
}

#[derive(Debug, Clone)]
pub struct ParsedSources {
    /// Top-level entries of every parsed source, in input order.
    pub root: Node,
    pub failures: Vec<SourceFailure>,
}

/// Parses every source in parallel and concatenates the results under one
/// synthetic root. A malformed source is skipped; the others still load.
pub fn parse_sources<S>(sources: &[S]) -> ParsedSources
where
    S: AsRef<str> + Sync,
{
    let results: Vec<Result<Vec<Node>, ParseError>> = sources
        .par_iter()
        .map(|source| parse_document(source.as_ref()))
        .collect();

    let mut children = Vec::new();
    let mut failures = Vec::new();
    for (index, result) in results.into_iter().enumerate() {
        match result {
            Ok(nodes) => children.extend(nodes),
            Err(error) => {
                log::warn!("Skipping source {}: {}", index, error);
                failures.push(SourceFailure { index, error });
            }
        }
    }

    log::debug!(
        "Parsed {} sources into {} top-level entries ({} failed)",
        sources.len(),
        children.len(),
        failures.len()
    );
    ParsedSources {
        root: Node::root(children),
        failures,
    }
}

/// Everything produced by loading a batch of sources.
#[derive(Debug, Clone)]
pub struct LoadedProperties {
    pub properties: PropertySet,
    pub failures: Vec<SourceFailure>,
    pub diagnostics: Vec<ExtractionError>,
}

/// Parses `sources` and extracts the property set from the combined tree.
pub fn load_properties<S>(sources: &[S], quotas: &Quotas) -> LoadedProperties
where
    S: AsRef<str> + Sync,
{
    let parsed = parse_sources(sources);
    let extraction = extract(&parsed.root, quotas);
    LoadedProperties {
        properties: extraction.properties,
        failures: parsed.failures,
        diagnostics: extraction.diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concatenates_in_order() {
        let parsed = parse_sources(&["a = 1 b = 2", "c = { d = 3 }"]);
        assert!(parsed.failures.is_empty());
        let keys: Vec<_> = parsed.root.children().iter().map(|n| n.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
        assert_eq!(parsed.root.key, stltxt::ROOT_KEY);
    }

    #[test]
    fn test_bad_source_is_skipped() {
        let parsed = parse_sources(&["a = 1", "b = { c = 2", "d = 4"]);
        assert_eq!(parsed.failures.len(), 1);
        assert_eq!(parsed.failures[0].index, 1);
        assert!(matches!(parsed.failures[0].error, ParseError::UnexpectedEof { .. }));
        assert_eq!(parsed.root.children().len(), 2);
    }
}
