use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{NewTodo, StoreError, TodoId, TodoRecord, TodoStore};

#[derive(Debug, Default)]
pub struct MemoryStore {
    todos: Mutex<HashMap<TodoId, TodoRecord>>,
    data_file: Option<PathBuf>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: impl Into<PathBuf>) -> eyre::Result<Self> {
        let path = path.into();

        let file = match fs::File::open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Ok(Self {
                    data_file: Some(path),
                    ..Self::default()
                });
            }
            Err(err) => eyre::bail!(err),
        };
        let data: DataOwned = ron::de::from_reader(file)?;

        match data {
            DataOwned::V1 { todos } => Ok(Self::from_v1(todos, path)),
        }
    }

    fn from_v1(todos: Vec<TodoRecord>, path: PathBuf) -> Self {
        let todos = todos
            .into_iter()
            .map(|todo| (todo.id.clone(), todo))
            .collect();

        Self {
            todos: Mutex::new(todos),
            data_file: Some(path),
        }
    }

    pub fn data_file(&self) -> Option<&Path> {
        self.data_file.as_deref()
    }

    pub async fn store(&self) -> eyre::Result<()> {
        let Some(path) = &self.data_file else {
            return Ok(());
        };

        let todos = self.todos.lock().await;
        let mut todos: Vec<_> = todos.values().collect();
        todos.sort_unstable_by(|a, b| (a.created_at, &a.id).cmp(&(b.created_at, &b.id)));
        let data = DataBorrowed::V1 { todos };

        let file = fs::File::create(path)?;
        let mut ron = ron::Serializer::new(file, Some(Default::default()))?;
        data.serialize(&mut ron)?;

        Ok(())
    }
}

impl TodoStore for MemoryStore {
    fn parse_id(&self, raw: &str) -> Option<TodoId> {
        Uuid::parse_str(raw)
            .ok()
            .map(|uuid| TodoId::new(uuid.to_string()))
    }

    async fn find_all(&self) -> Result<Vec<TodoRecord>, StoreError> {
        let todos = self.todos.lock().await;
        let mut todos: Vec<_> = todos.values().cloned().collect();
        todos.sort_unstable_by(|a, b| (a.created_at, &a.id).cmp(&(b.created_at, &b.id)));
        Ok(todos)
    }

    async fn insert(&self, todo: NewTodo) -> Result<TodoId, StoreError> {
        let id = TodoId::new(Uuid::new_v4().to_string());
        let record = TodoRecord {
            id: id.clone(),
            title: todo.title,
            completed: false,
            created_at: todo.created_at,
        };

        self.todos.lock().await.insert(id.clone(), record);
        Ok(id)
    }

    async fn update(&self, id: &TodoId, title: &str, completed: bool) -> Result<(), StoreError> {
        let mut todos = self.todos.lock().await;
        let todo = todos.get_mut(id).ok_or(StoreError::NotFound)?;
        todo.title = title.to_owned();
        todo.completed = completed;
        Ok(())
    }

    async fn delete(&self, id: &TodoId) -> Result<(), StoreError> {
        let mut todos = self.todos.lock().await;
        todos.remove(id).map(|_| ()).ok_or(StoreError::NotFound)
    }
}

#[derive(Serialize)]
enum DataBorrowed<'a> {
    V1 { todos: Vec<&'a TodoRecord> },
}

#[derive(Deserialize)]
enum DataOwned {
    V1 { todos: Vec<TodoRecord> },
}
