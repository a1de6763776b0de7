use crate::columns::ColumnResolver;
use crate::decoder::{NormalizedRecord, RowShapeDecoder};
use crate::result_item::ResultItem;
use serde_json::Value;

/// Applies the row decoder across a whole result set.
///
/// Output has exactly one record per input item, in input order. Items that
/// cannot be read come back as empty records so rank positions stay aligned
/// with what the backend returned.
#[derive(Debug, Clone, Default)]
pub struct NormalizationPipeline {
    resolver: ColumnResolver,
    decoder: RowShapeDecoder,
}

impl NormalizationPipeline {
    pub fn new(resolver: ColumnResolver) -> Self {
        Self {
            resolver,
            decoder: RowShapeDecoder::new(),
        }
    }

    pub fn resolver(&self) -> &ColumnResolver {
        &self.resolver
    }

    pub fn normalize(&self, items: &[ResultItem], columns: &[String]) -> Vec<NormalizedRecord> {
        let mut unreadable = 0usize;

        let records: Vec<NormalizedRecord> = items
            .iter()
            .enumerate()
            .map(|(idx, item)| {
                let (record, strategy) = self.decoder.decode_traced(item, columns);
                if strategy.is_none() {
                    unreadable += 1;
                    tracing::warn!(
                        "Item {} ({}) - no data extracted, keeping empty record",
                        idx,
                        item.kind()
                    );
                }
                record
            })
            .collect();

        tracing::info!(
            "Normalized {} item(s) against {} column(s), {} unreadable",
            records.len(),
            columns.len(),
            unreadable
        );
        records
    }

    /// Resolves the effective column list, then normalizes raw JSON items.
    pub fn normalize_values(
        &self,
        items: Vec<Value>,
        requested: &[String],
        advertised: Option<&[String]>,
    ) -> Vec<NormalizedRecord> {
        let columns = self.resolver.resolve(requested, advertised);
        let items: Vec<ResultItem> = items.into_iter().map(ResultItem::from_value).collect();
        self.normalize(&items, &columns)
    }
}
