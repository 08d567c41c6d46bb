use crate::error::{GatewayError, Result};

fn json_string(value: &str) -> String {
    serde_json::to_string(value).expect("string serialization never fails")
}

fn require_non_empty(target: &str, field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        Err(GatewayError::invalid_argument(target, field, "must not be empty"))
    } else {
        Ok(())
    }
}

/// A recursive tagged value modeling the gateway's JSON filter syntax.
///
/// Every variant knows how to render itself as a *pair* — a fragment
/// suitable as one comma-separated entry inside a JSON object (`"k":"v"`,
/// `"label":{...}`, `"label":[...]`) — via [`FilterNode::pair`]. Composite
/// nodes delegate to their children's `pair()` and join with commas;
/// [`FilterNode::as_object_entry`] brace-wraps a pair so it can appear as a
/// complete object inside a JSON array, which is how every `*Array`
/// variant below builds its elements.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterNode {
    SimpleCriteria {
        key: String,
        value: String,
        numeric: bool,
    },
    SimpleCriteriaObject {
        label: String,
        nested: Vec<FilterNode>,
    },
    SimpleCriteriaArray {
        label: String,
        items: Vec<FilterNode>,
    },
    SimpleCriteriaValueArray {
        key: String,
        values: Vec<String>,
    },
    SimpleCriteriaObjectArray {
        label: String,
        items: Vec<FilterNode>,
    },
    MultiCriteriaObject {
        label: Option<String>,
        criteria: Vec<FilterNode>,
    },
    MultiCriteriaObjectArray {
        label: String,
        items: Vec<FilterNode>,
    },
    NamedQuery {
        key: String,
        value: String,
    },
    NamedQueryObject {
        label: String,
        key: String,
        value: String,
    },
    NamedQueryCombination {
        key: String,
        value: String,
        combined: Option<Box<FilterNode>>,
    },
    NamedQueryObjectArrayCombination {
        label: String,
        key: String,
        value: String,
        array_label: String,
        items: Vec<FilterNode>,
    },
}

impl FilterNode {
    // --- factories --------------------------------------------------

    pub fn simple_criteria(key: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        let key = key.into();
        require_non_empty("SimpleCriteria", "key", &key)?;
        Ok(FilterNode::SimpleCriteria {
            key,
            value: value.into(),
            numeric: false,
        })
    }

    pub fn simple_criteria_numeric(key: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        let key = key.into();
        require_non_empty("SimpleCriteria", "key", &key)?;
        Ok(FilterNode::SimpleCriteria {
            key,
            value: value.into(),
            numeric: true,
        })
    }

    pub fn simple_criteria_object(label: impl Into<String>, nested: Vec<FilterNode>) -> Result<Self> {
        let label = label.into();
        require_non_empty("SimpleCriteriaObject", "label", &label)?;
        Ok(FilterNode::SimpleCriteriaObject { label, nested })
    }

    pub fn simple_criteria_array(
        label: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Self> {
        let label = label.into();
        require_non_empty("SimpleCriteriaArray", "label", &label)?;
        let item = FilterNode::simple_criteria(key, value)?;
        Ok(FilterNode::SimpleCriteriaArray {
            label,
            items: vec![item],
        })
    }

    pub fn simple_criteria_array_append(self, key: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        match self {
            FilterNode::SimpleCriteriaArray { label, mut items } => {
                items.push(FilterNode::simple_criteria(key, value)?);
                Ok(FilterNode::SimpleCriteriaArray { label, items })
            }
            other => Ok(other),
        }
    }

    pub fn simple_criteria_value_array(key: impl Into<String>, values: Vec<String>) -> Result<Self> {
        let key = key.into();
        require_non_empty("SimpleCriteriaValueArray", "key", &key)?;
        for v in &values {
            require_non_empty("SimpleCriteriaValueArray", "value", v)?;
        }
        Ok(FilterNode::SimpleCriteriaValueArray { key, values })
    }

    pub fn simple_criteria_object_array(label: impl Into<String>, items: Vec<FilterNode>) -> Result<Self> {
        let label = label.into();
        require_non_empty("SimpleCriteriaObjectArray", "label", &label)?;
        Ok(FilterNode::SimpleCriteriaObjectArray { label, items })
    }

    pub fn multi_criteria_object(label: Option<String>, criteria: Vec<FilterNode>) -> Result<Self> {
        if let Some(l) = &label {
            require_non_empty("MultiCriteriaObject", "label", l)?;
        }
        Ok(FilterNode::MultiCriteriaObject { label, criteria })
    }

    pub fn multi_criteria_object_array(label: impl Into<String>, items: Vec<FilterNode>) -> Result<Self> {
        let label = label.into();
        require_non_empty("MultiCriteriaObjectArray", "label", &label)?;
        Ok(FilterNode::MultiCriteriaObjectArray { label, items })
    }

    pub fn named_query(key: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        let key = key.into();
        require_non_empty("NamedQuery", "key", &key)?;
        Ok(FilterNode::NamedQuery {
            key,
            value: value.into(),
        })
    }

    pub fn named_query_object(
        label: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Self> {
        let label = label.into();
        require_non_empty("NamedQueryObject", "label", &label)?;
        let key = key.into();
        require_non_empty("NamedQueryObject", "key", &key)?;
        Ok(FilterNode::NamedQueryObject {
            label,
            key,
            value: value.into(),
        })
    }

    pub fn named_query_combination(
        key: impl Into<String>,
        value: impl Into<String>,
        combined: Option<FilterNode>,
    ) -> Result<Self> {
        let key = key.into();
        require_non_empty("NamedQueryCombination", "key", &key)?;
        Ok(FilterNode::NamedQueryCombination {
            key,
            value: value.into(),
            combined: combined.map(Box::new),
        })
    }

    pub fn named_query_object_array_combination(
        label: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
        array_label: impl Into<String>,
        items: Vec<FilterNode>,
    ) -> Result<Self> {
        let label = label.into();
        require_non_empty("NamedQueryObjectArrayCombination", "label", &label)?;
        let key = key.into();
        require_non_empty("NamedQueryObjectArrayCombination", "key", &key)?;
        let array_label = array_label.into();
        require_non_empty("NamedQueryObjectArrayCombination", "arrayLabel", &array_label)?;
        Ok(FilterNode::NamedQueryObjectArrayCombination {
            label,
            key,
            value: value.into(),
            array_label,
            items,
        })
    }

    // --- rendering ----------------------------------------------------

    /// Renders this node as a bare pair, suitable as one comma-joined
    /// entry inside an enclosing JSON object. Never includes the
    /// enclosing braces of an object itself (see `as_object_entry`).
    pub fn pair(&self) -> String {
        match self {
            FilterNode::SimpleCriteria { key, value, numeric } => {
                if *numeric {
                    format!("{}:{}", json_string(key), value)
                } else {
                    format!("{}:{}", json_string(key), json_string(value))
                }
            }
            FilterNode::SimpleCriteriaObject { label, nested } => {
                format!("{}:{{{}}}", json_string(label), join_pairs(nested))
            }
            FilterNode::SimpleCriteriaArray { label, items } => {
                format!("{}:[{}]", json_string(label), join_object_entries(items))
            }
            FilterNode::SimpleCriteriaValueArray { key, values } => {
                let rendered = values
                    .iter()
                    .map(|v| json_string(v))
                    .collect::<Vec<_>>()
                    .join(",");
                format!("{}:[{}]", json_string(key), rendered)
            }
            FilterNode::SimpleCriteriaObjectArray { label, items } => {
                format!("{}:[{}]", json_string(label), join_object_entries(items))
            }
            FilterNode::MultiCriteriaObject { label, criteria } => {
                let body = join_pairs(criteria);
                match label {
                    Some(label) => format!("{}:{{{}}}", json_string(label), body),
                    None => body,
                }
            }
            FilterNode::MultiCriteriaObjectArray { label, items } => {
                format!("{}:[{}]", json_string(label), join_object_entries(items))
            }
            FilterNode::NamedQuery { key, value } => {
                format!("{}:{}", json_string(key), json_string(value))
            }
            FilterNode::NamedQueryObject { label, key, value } => {
                format!(
                    "{}:{{{}:{}}}",
                    json_string(label),
                    json_string(key),
                    json_string(value)
                )
            }
            FilterNode::NamedQueryCombination { key, value, combined } => {
                let base = format!("{}:{}", json_string(key), json_string(value));
                match combined {
                    Some(extra) => format!("{},{}", base, extra.pair()),
                    None => base,
                }
            }
            FilterNode::NamedQueryObjectArrayCombination {
                label,
                key,
                value,
                array_label,
                items,
            } => {
                let inner = format!(
                    "{}:{{{}:{}}}",
                    json_string(label),
                    json_string(key),
                    json_string(value)
                );
                let array = format!("{}:[{}]", json_string(array_label), join_object_entries(items));
                format!("{},{}", inner, array)
            }
        }
    }

    /// Brace-wraps `pair()` so the node can stand as a complete JSON
    /// object — the operation every `*Array` variant applies to its
    /// elements.
    pub fn as_object_entry(&self) -> String {
        format!("{{{}}}", self.pair())
    }
}

fn join_pairs(nodes: &[FilterNode]) -> String {
    nodes.iter().map(FilterNode::pair).collect::<Vec<_>>().join(",")
}

fn join_object_entries(nodes: &[FilterNode]) -> String {
    nodes
        .iter()
        .map(FilterNode::as_object_entry)
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_criteria_array_matches_named_example() {
        let node = FilterNode::simple_criteria_array("names", "firstName", "John").unwrap();
        assert_eq!(node.pair(), "\"names\":[{\"firstName\":\"John\"}]");
    }

    #[test]
    fn numeric_simple_criteria_is_unquoted() {
        let node = FilterNode::simple_criteria_numeric("age", "42").unwrap();
        assert_eq!(node.pair(), "\"age\":42");
    }

    #[test]
    fn simple_criteria_value_array_renders_string_list() {
        let node = FilterNode::simple_criteria_value_array(
            "ids",
            vec!["a".to_string(), "b".to_string()],
        )
        .unwrap();
        assert_eq!(node.pair(), "\"ids\":[\"a\",\"b\"]");
    }

    #[test]
    fn simple_criteria_value_array_rejects_empty_values() {
        let err = FilterNode::simple_criteria_value_array("ids", vec!["".to_string()]).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidArgument { .. }));
    }

    #[test]
    fn empty_label_is_rejected() {
        let err = FilterNode::simple_criteria_object("", vec![]).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidArgument { .. }));
    }

    #[test]
    fn multi_criteria_object_with_label_wraps_body() {
        let node = FilterNode::multi_criteria_object(
            Some("name".to_string()),
            vec![
                FilterNode::simple_criteria("first", "John").unwrap(),
                FilterNode::simple_criteria("last", "Doe").unwrap(),
            ],
        )
        .unwrap();
        assert_eq!(node.pair(), "\"name\":{\"first\":\"John\",\"last\":\"Doe\"}");
    }

    #[test]
    fn multi_criteria_object_array_wraps_each_item() {
        let labeled = FilterNode::multi_criteria_object(
            Some("name".to_string()),
            vec![FilterNode::simple_criteria("first", "John").unwrap()],
        )
        .unwrap();
        let unlabeled = FilterNode::multi_criteria_object(
            None,
            vec![FilterNode::simple_criteria("zip", "90210").unwrap()],
        )
        .unwrap();
        let array = FilterNode::multi_criteria_object_array("people", vec![labeled, unlabeled]).unwrap();
        assert_eq!(
            array.pair(),
            "\"people\":[{\"name\":{\"first\":\"John\"}},{\"zip\":\"90210\"}]"
        );
    }

    #[test]
    fn named_query_combination_appends_extra_pair() {
        let extra = FilterNode::simple_criteria_object(
            "filter",
            vec![FilterNode::simple_criteria("active", "true").unwrap()],
        )
        .unwrap();
        let node = FilterNode::named_query_combination("term", "smith", Some(extra)).unwrap();
        assert_eq!(
            node.pair(),
            "\"term\":\"smith\",\"filter\":{\"active\":\"true\"}"
        );
    }
}
