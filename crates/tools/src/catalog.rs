//! The operation catalog.
//!
//! Every tool is generated from [`RESOURCES`]: one row per remote resource listing which of
//! list/get/create/update/delete the API allows. Adding a resource means adding a row.

use crate::error::ToolError;
use crate::query_options::QueryOptions;
use bugcrowd_api::query::encode_component;
use bugcrowd_api::{ApiRequest, Verb};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Number, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    List,
    Get,
    Create,
    Update,
    Delete,
}

impl OpKind {
    #[must_use]
    pub fn verb(self) -> Verb {
        match self {
            Self::List | Self::Get => Verb::Get,
            Self::Create => Verb::Post,
            Self::Update => Verb::Patch,
            Self::Delete => Verb::Delete,
        }
    }

    /// Whether the operation addresses one entity (`/<collection>/{id}`).
    #[must_use]
    pub fn targets_item(self) -> bool {
        matches!(self, Self::Get | Self::Update | Self::Delete)
    }

    #[must_use]
    pub fn accepts_query(self) -> bool {
        matches!(self, Self::List | Self::Get)
    }

    #[must_use]
    pub fn accepts_body(self) -> bool {
        matches!(self, Self::Create | Self::Update)
    }
}

use OpKind::{Create, Delete, Get, List, Update};

#[derive(Debug, Clone, Copy)]
pub struct ResourceSpec {
    /// Collection path segment, also the suffix of collection-level tool names.
    pub collection: &'static str,
    /// Suffix of item-level tool names.
    pub singular: &'static str,
    pub label: &'static str,
    pub label_plural: &'static str,
    pub ops: &'static [OpKind],
}

pub const RESOURCES: &[ResourceSpec] = &[
    ResourceSpec {
        collection: "access_invitations",
        singular: "access_invitation",
        label: "access invitation",
        label_plural: "access invitations",
        ops: &[List, Get, Create, Delete],
    },
    ResourceSpec {
        collection: "customer_assets",
        singular: "customer_asset",
        label: "customer asset",
        label_plural: "customer assets",
        ops: &[List, Get, Create, Update, Delete],
    },
    ResourceSpec {
        collection: "organizations",
        singular: "organization",
        label: "organization",
        label_plural: "organizations",
        ops: &[List, Get, Update],
    },
    ResourceSpec {
        collection: "programs",
        singular: "program",
        label: "program",
        label_plural: "programs",
        ops: &[List, Get],
    },
    ResourceSpec {
        collection: "reports",
        singular: "report",
        label: "report",
        label_plural: "reports",
        ops: &[List, Get, Create, Update, Delete],
    },
    ResourceSpec {
        collection: "submissions",
        singular: "submission",
        label: "submission",
        label_plural: "submissions",
        ops: &[List, Get, Create, Update, Delete],
    },
    ResourceSpec {
        collection: "submission_activities",
        singular: "submission_activity",
        label: "submission activity",
        label_plural: "submission activities",
        ops: &[List, Get],
    },
    ResourceSpec {
        collection: "submission_comments",
        singular: "submission_comment",
        label: "submission comment",
        label_plural: "submission comments",
        ops: &[List, Get],
    },
    ResourceSpec {
        collection: "authentication_logs",
        singular: "authentication_log",
        label: "authentication log",
        label_plural: "authentication logs",
        ops: &[List],
    },
    ResourceSpec {
        collection: "authorization_logs",
        singular: "authorization_log",
        label: "authorization log",
        label_plural: "authorization logs",
        ops: &[List],
    },
    ResourceSpec {
        collection: "disclosure_requests",
        singular: "disclosure_request",
        label: "disclosure request",
        label_plural: "disclosure requests",
        ops: &[List, Get, Create],
    },
    ResourceSpec {
        collection: "external_issues",
        singular: "external_issue",
        label: "external issue",
        label_plural: "external issues",
        ops: &[List, Get, Create, Update, Delete],
    },
    ResourceSpec {
        collection: "monetary_rewards",
        singular: "monetary_reward",
        label: "monetary reward",
        label_plural: "monetary rewards",
        ops: &[List, Get],
    },
    ResourceSpec {
        collection: "payments",
        singular: "payment",
        label: "payment",
        label_plural: "payments",
        ops: &[List, Get],
    },
    ResourceSpec {
        collection: "target_groups",
        singular: "target_group",
        label: "target group",
        label_plural: "target groups",
        ops: &[List, Get],
    },
    ResourceSpec {
        collection: "users",
        singular: "user",
        label: "user",
        label_plural: "users",
        ops: &[List, Get],
    },
];

/// One named (verb, path template) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub name: String,
    pub kind: OpKind,
    pub resource: ResourceRef,
    pub path_template: String,
    pub description: String,
}

/// The parts of a [`ResourceSpec`] an operation keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceRef {
    pub collection: &'static str,
    pub label: &'static str,
}

impl ResourceSpec {
    #[must_use]
    pub fn operation(&self, kind: OpKind) -> Operation {
        let name = match kind {
            List => format!("get_{}", self.collection),
            Get => format!("get_{}", self.singular),
            Create => format!("post_{}", self.collection),
            Update => format!("patch_{}", self.singular),
            Delete => format!("delete_{}", self.singular),
        };
        let path_template = if kind.targets_item() {
            format!("/{}/{{id}}", self.collection)
        } else {
            format!("/{}", self.collection)
        };
        let description = match kind {
            List => format!("List all {}.", self.label_plural),
            Get => format!("Get a specific {} by ID.", self.label),
            Create => format!("Create a new {}.", self.label),
            Update => format!("Update {} {} by ID.", article(self.label), self.label),
            Delete => format!("Delete {} {} by ID.", article(self.label), self.label),
        };
        Operation {
            name,
            kind,
            resource: ResourceRef {
                collection: self.collection,
                label: self.label,
            },
            path_template,
            description,
        }
    }
}

fn article(label: &str) -> &'static str {
    match label.chars().next() {
        Some('a' | 'e' | 'i' | 'o' | 'u') => "an",
        _ => "a",
    }
}

/// Expand [`RESOURCES`] into the full list of operations, in table order.
#[must_use]
pub fn operations() -> Vec<Operation> {
    RESOURCES
        .iter()
        .flat_map(|r| r.ops.iter().map(move |k| r.operation(*k)))
        .collect()
}

#[derive(Debug, Deserialize)]
struct QueryArgs {
    #[serde(flatten)]
    query: QueryOptions,
}

#[derive(Debug, Deserialize)]
struct ItemQueryArgs {
    id: EntityId,
    #[serde(flatten)]
    query: QueryOptions,
}

#[derive(Debug, Deserialize)]
struct BodyArgs {
    data: Value,
}

#[derive(Debug, Deserialize)]
struct ItemBodyArgs {
    id: EntityId,
    data: Value,
}

#[derive(Debug, Deserialize)]
struct ItemArgs {
    id: EntityId,
}

/// Entity ids arrive as strings, but numeric ids are accepted too.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EntityId {
    Text(String),
    Number(Number),
}

impl EntityId {
    fn into_string(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Number(n) => n.to_string(),
        }
    }
}

impl Operation {
    #[must_use]
    pub fn verb(&self) -> Verb {
        self.kind.verb()
    }

    /// Substitute the percent-encoded entity id into the path template.
    #[must_use]
    pub fn path_for(&self, id: &str) -> String {
        self.path_template.replace("{id}", &encode_component(id))
    }

    /// Translate tool arguments into the single request this operation sends.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::InvalidArguments`] if the arguments do not have the shape the
    /// operation needs (missing `id` or `data`, non-object arguments, empty id).
    pub fn build_request(&self, arguments: Value) -> Result<ApiRequest, ToolError> {
        let arguments = match arguments {
            Value::Null => Value::Object(serde_json::Map::new()),
            other => other,
        };

        let request = match self.kind {
            List => {
                let args: QueryArgs = self.parse_args(arguments)?;
                ApiRequest::new(self.verb(), self.path_template.clone())
                    .with_query(args.query.to_query())
            }
            Get => {
                let args: ItemQueryArgs = self.parse_args(arguments)?;
                let path = self.item_path(args.id)?;
                ApiRequest::new(self.verb(), path).with_query(args.query.to_query())
            }
            Create => {
                let args: BodyArgs = self.parse_args(arguments)?;
                ApiRequest::new(self.verb(), self.path_template.clone()).with_body(args.data)
            }
            Update => {
                let args: ItemBodyArgs = self.parse_args(arguments)?;
                let path = self.item_path(args.id)?;
                ApiRequest::new(self.verb(), path).with_body(args.data)
            }
            Delete => {
                let args: ItemArgs = self.parse_args(arguments)?;
                ApiRequest::new(self.verb(), self.item_path(args.id)?)
            }
        };
        Ok(request)
    }

    fn parse_args<T: DeserializeOwned>(&self, arguments: Value) -> Result<T, ToolError> {
        if !arguments.is_object() {
            return Err(self.invalid("arguments must be a JSON object"));
        }
        serde_json::from_value(arguments).map_err(|e| self.invalid(e.to_string()))
    }

    fn item_path(&self, id: EntityId) -> Result<String, ToolError> {
        let id = id.into_string();
        if id.trim().is_empty() {
            return Err(self.invalid("id must not be empty"));
        }
        Ok(self.path_for(&id))
    }

    fn invalid(&self, message: impl Into<String>) -> ToolError {
        ToolError::InvalidArguments {
            tool: self.name.clone(),
            message: message.into(),
        }
    }
}
