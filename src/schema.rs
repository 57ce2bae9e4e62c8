//! Node kind catalogue.
//!
//! Every [NodeKind] describes its ports, form fields and default field values here. The set of
//! kinds is closed, so the catalogue is a set of `match` tables rather than a runtime registry.

use crate::properties::{NodeData, NodeKind};
use serde::Serialize;
use serde_json::{json, Value};

/// Data field that carries template text on template-owning kinds.
pub const TEMPLATE_FIELD: &str = "text";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PortDirection {
    Input,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PortSpec {
    pub id: &'static str,
    pub direction: PortDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Number,
    Textarea { rows: u8 },
    Select { options: &'static [(&'static str, &'static str)] },
    Checkbox,
    Slider { min: f64, max: f64, step: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub field_type: FieldType,
    pub default: Value,
}

impl FieldSpec {
    fn new(name: &'static str, label: &'static str, field_type: FieldType, default: Value) -> Self {
        FieldSpec {
            name,
            label,
            field_type,
            default,
        }
    }
}

const IO_TYPES: &[(&str, &str)] = &[("Text", "Text"), ("File", "File")];
const OUTPUT_TYPES: &[(&str, &str)] = &[("Text", "Text"), ("File", "Image")];
const FILTER_CONDITIONS: &[(&str, &str)] = &[
    ("equals", "Equals"),
    ("contains", "Contains"),
    ("greaterThan", "Greater Than"),
    ("lessThan", "Less Than"),
];
const TRANSFORM_OPERATIONS: &[(&str, &str)] = &[
    ("uppercase", "Uppercase"),
    ("lowercase", "Lowercase"),
    ("reverse", "Reverse"),
    ("trim", "Trim"),
    ("custom", "Custom"),
];
const AGGREGATIONS: &[(&str, &str)] = &[
    ("merge", "Merge Objects"),
    ("concat", "Concatenate Arrays"),
    ("sum", "Sum Values"),
    ("average", "Average Values"),
];
const VALIDATIONS: &[(&str, &str)] = &[
    ("required", "Required Field"),
    ("email", "Email Format"),
    ("number", "Numeric Only"),
    ("regex", "Custom Regex"),
    ("length", "Length Check"),
];
const TIME_UNITS: &[(&str, &str)] = &[
    ("milliseconds", "Milliseconds"),
    ("seconds", "Seconds"),
    ("minutes", "Minutes"),
];

impl NodeKind {
    pub fn all() -> &'static [NodeKind] {
        &[
            NodeKind::Input,
            NodeKind::Output,
            NodeKind::Llm,
            NodeKind::Text,
            NodeKind::Filter,
            NodeKind::Transform,
            NodeKind::Aggregator,
            NodeKind::Validator,
            NodeKind::Delay,
        ]
    }

    /// Prefix of allocated ids, e.g. `input` in `input_0`.
    pub fn id_prefix(&self) -> &'static str {
        match self {
            NodeKind::Input => "input",
            NodeKind::Output => "output",
            NodeKind::Llm => "llm",
            NodeKind::Text => "text",
            NodeKind::Filter => "filter",
            NodeKind::Transform => "transform",
            NodeKind::Aggregator => "aggregator",
            NodeKind::Validator => "validator",
            NodeKind::Delay => "delay",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            NodeKind::Input => "Input",
            NodeKind::Output => "Output",
            NodeKind::Llm => "LLM",
            NodeKind::Text => "Text",
            NodeKind::Filter => "Filter",
            NodeKind::Transform => "Transform",
            NodeKind::Aggregator => "Aggregator",
            NodeKind::Validator => "Validator",
            NodeKind::Delay => "Delay",
        }
    }

    pub fn description(&self) -> Option<&'static str> {
        match self {
            NodeKind::Llm => Some("This is a LLM."),
            NodeKind::Filter => Some("Filter data based on conditions"),
            NodeKind::Transform => Some("Transform and modify data"),
            NodeKind::Aggregator => Some("Combine multiple data sources"),
            NodeKind::Validator => Some("Validate data against rules"),
            NodeKind::Delay => Some("Add a time delay to execution"),
            NodeKind::Input | NodeKind::Output | NodeKind::Text => None,
        }
    }

    pub fn inputs(&self) -> &'static [&'static str] {
        match self {
            NodeKind::Input => &[],
            NodeKind::Output => &["value"],
            NodeKind::Llm => &["system", "prompt"],
            NodeKind::Text => &["variable-input"],
            NodeKind::Filter | NodeKind::Transform => &["input"],
            NodeKind::Aggregator => &["input1", "input2", "input3"],
            NodeKind::Validator => &["data"],
            NodeKind::Delay => &["trigger"],
        }
    }

    pub fn outputs(&self) -> &'static [&'static str] {
        match self {
            NodeKind::Input => &["value"],
            NodeKind::Output => &[],
            NodeKind::Llm => &["response"],
            NodeKind::Text | NodeKind::Transform => &["output"],
            NodeKind::Filter => &["passed", "failed"],
            NodeKind::Aggregator => &["combined"],
            NodeKind::Validator => &["valid", "invalid"],
            NodeKind::Delay => &["delayed"],
        }
    }

    /// All ports of this kind, inputs first.
    pub fn ports(&self) -> Vec<PortSpec> {
        let inputs = self.inputs().iter().map(|id| PortSpec {
            id: *id,
            direction: PortDirection::Input,
        });
        let outputs = self.outputs().iter().map(|id| PortSpec {
            id: *id,
            direction: PortDirection::Output,
        });
        inputs.chain(outputs).collect()
    }

    pub fn fields(&self) -> Vec<FieldSpec> {
        match self {
            NodeKind::Input => vec![
                FieldSpec::new("inputName", "Name:", FieldType::Text, json!("")),
                FieldSpec::new(
                    "inputType",
                    "Type:",
                    FieldType::Select { options: IO_TYPES },
                    json!("Text"),
                ),
            ],
            NodeKind::Output => vec![
                FieldSpec::new("outputName", "Name:", FieldType::Text, json!("output_")),
                FieldSpec::new(
                    "outputType",
                    "Type:",
                    FieldType::Select {
                        options: OUTPUT_TYPES,
                    },
                    json!("Text"),
                ),
            ],
            NodeKind::Llm => vec![],
            NodeKind::Text => vec![FieldSpec::new(
                TEMPLATE_FIELD,
                "Content:",
                FieldType::Textarea { rows: 4 },
                json!(""),
            )],
            NodeKind::Filter => vec![
                FieldSpec::new(
                    "filterField",
                    "Field to Filter",
                    FieldType::Text,
                    json!("field"),
                ),
                FieldSpec::new(
                    "condition",
                    "Condition",
                    FieldType::Select {
                        options: FILTER_CONDITIONS,
                    },
                    json!("equals"),
                ),
                FieldSpec::new("value", "Value", FieldType::Text, json!("")),
            ],
            NodeKind::Transform => vec![
                FieldSpec::new(
                    "operation",
                    "Operation",
                    FieldType::Select {
                        options: TRANSFORM_OPERATIONS,
                    },
                    json!("uppercase"),
                ),
                FieldSpec::new(
                    "customTransform",
                    "Custom Transformation",
                    FieldType::Textarea { rows: 2 },
                    json!(""),
                ),
            ],
            NodeKind::Aggregator => vec![
                FieldSpec::new(
                    "aggregationType",
                    "Aggregation Type",
                    FieldType::Select {
                        options: AGGREGATIONS,
                    },
                    json!("merge"),
                ),
                FieldSpec::new(
                    "separator",
                    "Separator (for concat)",
                    FieldType::Text,
                    json!(","),
                ),
                FieldSpec::new(
                    "ignoreNull",
                    "Ignore Null Values",
                    FieldType::Checkbox,
                    json!(true),
                ),
            ],
            NodeKind::Validator => vec![
                FieldSpec::new(
                    "validationType",
                    "Validation Type",
                    FieldType::Select {
                        options: VALIDATIONS,
                    },
                    json!("required"),
                ),
                FieldSpec::new("pattern", "Regex Pattern", FieldType::Text, json!("")),
                FieldSpec::new("minLength", "Min Length", FieldType::Number, json!(0)),
                FieldSpec::new("maxLength", "Max Length", FieldType::Number, json!(100)),
                FieldSpec::new("strictMode", "Strict Mode", FieldType::Checkbox, json!(false)),
            ],
            NodeKind::Delay => vec![
                FieldSpec::new(
                    "delayAmount",
                    "Delay (seconds)",
                    FieldType::Slider {
                        min: 0.0,
                        max: 60.0,
                        step: 1.0,
                    },
                    json!(5),
                ),
                FieldSpec::new(
                    "unit",
                    "Time Unit",
                    FieldType::Select {
                        options: TIME_UNITS,
                    },
                    json!("seconds"),
                ),
                FieldSpec::new(
                    "passThrough",
                    "Pass Through Data",
                    FieldType::Checkbox,
                    json!(true),
                ),
                FieldSpec::new(
                    "errorOnTimeout",
                    "Error on Timeout",
                    FieldType::Checkbox,
                    json!(false),
                ),
            ],
        }
    }

    pub fn default_data(&self) -> NodeData {
        self.fields()
            .into_iter()
            .map(|field| (field.name.to_string(), field.default))
            .collect()
    }

    /// The data field whose `{{ }}` references drive auto edges, if this kind owns one.
    pub fn template_field(&self) -> Option<&'static str> {
        match self {
            NodeKind::Text => Some(TEMPLATE_FIELD),
            _ => None,
        }
    }

    pub fn is_template(&self) -> bool {
        self.template_field().is_some()
    }
}
