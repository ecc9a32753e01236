use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// One observation in the reduced 2-D embedding, with its cluster assignment.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct DataPoint {
    pub x: f64,
    pub y: f64,
    pub cluster: i64,
}

/// One original variable placed in the same embedding. Keyed by `variable`.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct VariablePoint {
    pub variable: String,
    pub x: f64,
    pub y: f64,
}

/// Clustering quality for one candidate cluster count. The service makes no
/// ordering promise for these.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct QualitySample {
    pub clusters: u32,
    pub mse: f64,
}

/// A parallel-coordinates record as it arrives on the wire: the cluster id
/// plus a flat map of dimension name to value, where a value may be null.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct RawPcpRecord {
    pub cluster: i64,
    #[serde(flatten)]
    pub values: BTreeMap<String, Option<f64>>,
}

/// A normalized parallel-coordinates record. Null values have been replaced
/// by zero; dimensions the service never sent stay absent.
#[derive(Clone, Debug, PartialEq)]
pub struct PcpRecord {
    pub cluster: i64,
    pub values: BTreeMap<String, f64>,
}

impl PcpRecord {
    pub fn value(&self, dimension: &str) -> Option<f64> {
        self.values.get(dimension).copied()
    }
}

/// Zero-fill imputation. A null on the wire becomes `0.0`; this is a lossy,
/// explicit policy, not interpolation.
pub fn normalize_records(raw: Vec<RawPcpRecord>) -> Vec<PcpRecord> {
    raw.into_iter()
        .map(|record| {
            let values = record
                .values
                .into_iter()
                .map(|(dimension, value)| (dimension, value.unwrap_or(0.0)))
                .collect();
            PcpRecord {
                cluster: record.cluster,
                values,
            }
        })
        .collect()
}

/// The natural dimension order: the union of every record's dimension names,
/// lexicographic. `cluster` lives outside the value map and never appears.
pub fn dimension_names(records: &[PcpRecord]) -> Vec<String> {
    let mut names = BTreeSet::new();
    for record in records {
        for name in record.values.keys() {
            names.insert(name.clone());
        }
    }
    names.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(cluster: i64, pairs: &[(&str, Option<f64>)]) -> RawPcpRecord {
        RawPcpRecord {
            cluster,
            values: pairs
                .iter()
                .map(|(name, value)| (name.to_string(), *value))
                .collect(),
        }
    }

    #[test]
    fn null_values_become_zero() {
        let records = normalize_records(vec![raw(
            1,
            &[("age", Some(41.0)), ("income", None)],
        )]);
        assert_eq!(records[0].value("age"), Some(41.0));
        assert_eq!(records[0].value("income"), Some(0.0));
    }

    #[test]
    fn absent_dimensions_stay_absent() {
        let records = normalize_records(vec![raw(0, &[("age", Some(41.0))])]);
        assert_eq!(records[0].value("income"), None);
    }

    #[test]
    fn dimension_names_union_is_sorted() {
        let records = normalize_records(vec![
            raw(0, &[("income", Some(1.0))]),
            raw(1, &[("age", Some(2.0)), ("rate", Some(3.0))]),
        ]);
        assert_eq!(dimension_names(&records), vec!["age", "income", "rate"]);
    }

    #[test]
    fn pcp_record_decodes_from_flat_json() {
        let raw: Vec<RawPcpRecord> =
            serde_json::from_str(r#"[{"age": 41, "income": null, "cluster": 2}]"#).unwrap();
        assert_eq!(raw[0].cluster, 2);
        assert_eq!(raw[0].values["age"], Some(41.0));
        assert_eq!(raw[0].values["income"], None);
    }
}
