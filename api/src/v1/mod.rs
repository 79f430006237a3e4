use serde::{Deserialize, Serialize};

/// A todo item as sent to clients.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoView {
    pub id: String,
    pub title: String,
    pub completed: bool,
    /// RFC 3339, second precision.
    pub created_at: String,
}

/// Body of `POST /todo/`.
///
/// `completed` is accepted for symmetry with updates but new todos always
/// start uncompleted.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CreateTodo {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub completed: Option<bool>,
}

/// Body of `PUT /todo/{id}`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UpdateTodo {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TodoList {
    pub data: Vec<TodoView>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TodoCreated {
    pub message: String,
    pub todo_id: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Error body. `error` carries the underlying failure text when there is one.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_body_tolerates_missing_fields() {
        let body: CreateTodo = serde_json::from_str("{}").unwrap();
        assert!(body.title.is_empty());
        assert_eq!(body.completed, None);

        let body: CreateTodo =
            serde_json::from_str(r#"{"title":"buy milk","completed":true}"#).unwrap();
        assert_eq!(body.title, "buy milk");
        assert_eq!(body.completed, Some(true));
    }

    #[test]
    fn update_body_defaults_completed_to_false() {
        let body: UpdateTodo = serde_json::from_str(r#"{"title":"buy milk"}"#).unwrap();
        assert!(!body.completed);
    }

    #[test]
    fn view_uses_snake_case_timestamp_key() {
        let view = TodoView {
            id: "abc".into(),
            title: "buy milk".into(),
            completed: false,
            created_at: "2024-01-01T00:00:00Z".into(),
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["created_at"], "2024-01-01T00:00:00Z");
        assert_eq!(json["completed"], false);
    }

    #[test]
    fn error_body_omits_missing_detail() {
        let body = ErrorBody {
            message: "Title is required".into(),
            error: None,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"message":"Title is required"}"#);
    }
}
