//! # Document Store Actor
//!
//! One [`ResourceActor`] owns one collection of documents. Callers talk to it
//! through a cloneable [`ResourceClient`]; every request carries a oneshot
//! channel for the reply.
//!
//! The actor handles one message at a time, so each request (including a
//! read-modify-write [`ResourceRequest::Action`]) is atomic with respect to
//! every other request on the same collection. Mutations are applied to a
//! copy of the document and only committed when the hook succeeds.

use std::cmp::Ordering;
use std::fmt::{self, Debug, Display};
use std::hash::Hash;

use indexmap::IndexMap;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, instrument, warn};

// =============================================================================
// 1. THE ABSTRACTION (Traits with Hooks, Payloads, and Actions)
// =============================================================================

/// Trait that any domain document must implement to be managed by ResourceActor
pub trait Entity: Clone + Debug + Send + Sync + 'static {
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug;
    type CreatePayload: Send + Sync + Debug;
    type Patch: Send + Sync + Debug;
    type Action: Send + Sync + Debug;
    type ActionResult: Send + Sync + Debug;
    type Error: std::error::Error + Clone + Send + Sync + 'static;

    /// Collection name, used in logs.
    const COLLECTION: &'static str;

    fn id(&self) -> &Self::Id;

    /// Construct the full document from the generated ID and the payload
    fn from_create(id: Self::Id, payload: Self::CreatePayload) -> Result<Self, Self::Error>;

    /// Value that must be unique across the collection (a unique index).
    fn unique_key(&self) -> Option<String> {
        None
    }

    // --- Lifecycle Hooks ---

    fn on_create(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
    fn on_update(&mut self, patch: Self::Patch) -> Result<(), Self::Error>;
    fn on_delete(&self) -> Result<(), Self::Error> {
        Ok(())
    }

    // --- Action Handler ---

    /// Handle a document-specific read-modify-write operation
    fn handle_action(&mut self, action: Self::Action) -> Result<Self::ActionResult, Self::Error>;
}

/// Failures raised by the store itself, wrapping the document's own error type.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameworkError<E> {
    NotFound(String),
    DuplicateKey(String),
    Entity(E),
    ActorClosed,
    ActorDropped,
}

impl<E: Display> Display for FrameworkError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameworkError::NotFound(id) => write!(f, "Item not found: {}", id),
            FrameworkError::DuplicateKey(key) => write!(f, "Duplicate key: {}", key),
            FrameworkError::Entity(e) => write!(f, "{}", e),
            FrameworkError::ActorClosed => write!(f, "Actor closed"),
            FrameworkError::ActorDropped => write!(f, "Actor dropped"),
        }
    }
}

impl<E: Debug + Display> std::error::Error for FrameworkError<E> {}

// =============================================================================
// 2. QUERIES
// =============================================================================

type Filter<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;
type Sorter<T> = Box<dyn Fn(&T, &T) -> Ordering + Send + Sync>;

/// Filtered, sorted, paginated find. Without a sort, results come back in
/// insertion order.
pub struct Query<T> {
    filter: Option<Filter<T>>,
    sort: Option<Sorter<T>>,
    skip: usize,
    limit: Option<usize>,
}

impl<T: Entity> Query<T> {
    pub fn all() -> Self {
        Self {
            filter: None,
            sort: None,
            skip: 0,
            limit: None,
        }
    }

    pub fn filter(mut self, filter: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        self.filter = Some(Box::new(filter));
        self
    }

    pub fn sort_by(mut self, sort: impl Fn(&T, &T) -> Ordering + Send + Sync + 'static) -> Self {
        self.sort = Some(Box::new(sort));
        self
    }

    pub fn skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    fn matches(&self, item: &T) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(item))
    }

    fn count<'a>(&self, items: impl Iterator<Item = &'a T>) -> usize {
        items.filter(|item| self.matches(item)).count()
    }

    fn run<'a>(&self, items: impl Iterator<Item = &'a T>) -> Vec<T> {
        let mut matched: Vec<&T> = items.filter(|item| self.matches(item)).collect();
        if let Some(sort) = &self.sort {
            // stable, so ties keep insertion order
            matched.sort_by(|a, b| sort(*a, *b));
        }
        matched
            .into_iter()
            .skip(self.skip)
            .take(self.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect()
    }
}

impl<T> Debug for Query<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("filtered", &self.filter.is_some())
            .field("sorted", &self.sort.is_some())
            .field("skip", &self.skip)
            .field("limit", &self.limit)
            .finish()
    }
}

// =============================================================================
// 3. THE GENERIC MESSAGES
// =============================================================================

pub type Response<T, E> = oneshot::Sender<Result<T, FrameworkError<E>>>;

#[derive(Debug)]
pub enum ResourceRequest<T: Entity> {
    Create {
        payload: T::CreatePayload,
        respond_to: Response<T, T::Error>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>, T::Error>,
    },
    Find {
        query: Query<T>,
        respond_to: Response<Vec<T>, T::Error>,
    },
    Count {
        query: Query<T>,
        respond_to: Response<usize, T::Error>,
    },
    Update {
        id: T::Id,
        patch: T::Patch,
        respond_to: Response<T, T::Error>,
    },
    Delete {
        id: T::Id,
        respond_to: Response<T, T::Error>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: Response<T::ActionResult, T::Error>,
    },
}

// =============================================================================
// 4. THE GENERIC ACTOR SERVER
// =============================================================================

pub struct ResourceActor<T: Entity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: IndexMap<T::Id, T>,
    next_id_fn: Box<dyn Fn() -> T::Id + Send + Sync>,
}

impl<T: Entity> ResourceActor<T> {
    pub fn new(
        buffer_size: usize,
        next_id_fn: impl Fn() -> T::Id + Send + Sync + 'static,
    ) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            store: IndexMap::new(),
            next_id_fn: Box::new(next_id_fn),
        };
        let client = ResourceClient::new(sender);
        (actor, client)
    }

    /// Runs until every client has been dropped.
    #[instrument(name = "resource_actor", skip(self), fields(collection = T::COLLECTION))]
    pub async fn run(mut self) {
        info!("Collection actor starting");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { payload, respond_to } => {
                    let _ = respond_to.send(self.handle_create(payload));
                }
                ResourceRequest::Get { id, respond_to } => {
                    let _ = respond_to.send(Ok(self.store.get(&id).cloned()));
                }
                ResourceRequest::Find { query, respond_to } => {
                    let _ = respond_to.send(Ok(query.run(self.store.values())));
                }
                ResourceRequest::Count { query, respond_to } => {
                    let _ = respond_to.send(Ok(query.count(self.store.values())));
                }
                ResourceRequest::Update { id, patch, respond_to } => {
                    let _ = respond_to.send(self.handle_update(id, patch));
                }
                ResourceRequest::Delete { id, respond_to } => {
                    let _ = respond_to.send(self.handle_delete(id));
                }
                ResourceRequest::Action { id, action, respond_to } => {
                    let _ = respond_to.send(self.handle_action(id, action));
                }
            }
        }

        info!(documents = self.store.len(), "Collection actor stopped");
    }

    fn handle_create(&mut self, payload: T::CreatePayload) -> Result<T, FrameworkError<T::Error>> {
        let id = (self.next_id_fn)();
        let mut item = T::from_create(id.clone(), payload).map_err(FrameworkError::Entity)?;
        item.on_create().map_err(FrameworkError::Entity)?;
        self.ensure_unique(&item)?;

        debug!(id = %id, "Document created");
        self.store.insert(id, item.clone());
        Ok(item)
    }

    fn handle_update(&mut self, id: T::Id, patch: T::Patch) -> Result<T, FrameworkError<T::Error>> {
        let mut updated = self
            .store
            .get(&id)
            .cloned()
            .ok_or_else(|| FrameworkError::NotFound(id.to_string()))?;
        updated.on_update(patch).map_err(FrameworkError::Entity)?;
        self.ensure_unique(&updated)?;

        debug!(id = %id, "Document updated");
        self.store.insert(id, updated.clone());
        Ok(updated)
    }

    fn handle_delete(&mut self, id: T::Id) -> Result<T, FrameworkError<T::Error>> {
        let item = self
            .store
            .get(&id)
            .ok_or_else(|| FrameworkError::NotFound(id.to_string()))?;
        item.on_delete().map_err(FrameworkError::Entity)?;

        debug!(id = %id, "Document deleted");
        self.store
            .shift_remove(&id)
            .ok_or_else(|| FrameworkError::NotFound(id.to_string()))
    }

    fn handle_action(
        &mut self,
        id: T::Id,
        action: T::Action,
    ) -> Result<T::ActionResult, FrameworkError<T::Error>> {
        let mut updated = self
            .store
            .get(&id)
            .cloned()
            .ok_or_else(|| FrameworkError::NotFound(id.to_string()))?;
        let result = updated.handle_action(action).map_err(|e| {
            warn!(id = %id, error = %e, "Action rejected");
            FrameworkError::Entity(e)
        })?;
        self.ensure_unique(&updated)?;

        self.store.insert(id, updated);
        Ok(result)
    }

    fn ensure_unique(&self, candidate: &T) -> Result<(), FrameworkError<T::Error>> {
        let Some(key) = candidate.unique_key() else {
            return Ok(());
        };
        let taken = self
            .store
            .values()
            .any(|other| other.id() != candidate.id() && other.unique_key().as_deref() == Some(key.as_str()));
        if taken {
            warn!(key = %key, "Unique key already taken");
            return Err(FrameworkError::DuplicateKey(key));
        }
        Ok(())
    }
}

// =============================================================================
// 5. THE GENERIC CLIENT
// =============================================================================

#[derive(Clone)]
pub struct ResourceClient<T: Entity> {
    sender: mpsc::Sender<ResourceRequest<T>>,
}

impl<T: Entity> ResourceClient<T> {
    pub(crate) fn new(sender: mpsc::Sender<ResourceRequest<T>>) -> Self {
        Self { sender }
    }

    async fn call<R>(
        &self,
        request: impl FnOnce(Response<R, T::Error>) -> ResourceRequest<T>,
    ) -> Result<R, FrameworkError<T::Error>> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(request(respond_to))
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn create(&self, payload: T::CreatePayload) -> Result<T, FrameworkError<T::Error>> {
        self.call(|respond_to| ResourceRequest::Create { payload, respond_to }).await
    }

    pub async fn get(&self, id: T::Id) -> Result<Option<T>, FrameworkError<T::Error>> {
        self.call(|respond_to| ResourceRequest::Get { id, respond_to }).await
    }

    pub async fn find(&self, query: Query<T>) -> Result<Vec<T>, FrameworkError<T::Error>> {
        self.call(|respond_to| ResourceRequest::Find { query, respond_to }).await
    }

    pub async fn count(&self, query: Query<T>) -> Result<usize, FrameworkError<T::Error>> {
        self.call(|respond_to| ResourceRequest::Count { query, respond_to }).await
    }

    pub async fn update(&self, id: T::Id, patch: T::Patch) -> Result<T, FrameworkError<T::Error>> {
        self.call(|respond_to| ResourceRequest::Update { id, patch, respond_to }).await
    }

    pub async fn delete(&self, id: T::Id) -> Result<T, FrameworkError<T::Error>> {
        self.call(|respond_to| ResourceRequest::Delete { id, respond_to }).await
    }

    pub async fn perform_action(
        &self,
        id: T::Id,
        action: T::Action,
    ) -> Result<T::ActionResult, FrameworkError<T::Error>> {
        self.call(|respond_to| ResourceRequest::Action { id, action, respond_to }).await
    }
}

// =============================================================================
// 6. EXAMPLE USAGE (Test)
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
    use std::sync::Arc;
    use thiserror::Error;

    // --- Document Definition ---

    #[derive(Clone, Debug, PartialEq)]
    struct Account {
        id: String,
        handle: String,
        balance: i64,
    }

    #[derive(Debug)]
    struct AccountCreate {
        handle: String,
    }

    #[derive(Debug)]
    struct AccountPatch {
        handle: Option<String>,
    }

    #[derive(Debug)]
    enum AccountAction {
        Deposit(i64),
        Withdraw(i64),
    }

    #[derive(Debug, Clone, Error, PartialEq)]
    enum AccountError {
        #[error("Overdrawn by {0}")]
        Overdrawn(i64),
    }

    impl Entity for Account {
        type Id = String;
        type CreatePayload = AccountCreate;
        type Patch = AccountPatch;
        type Action = AccountAction;
        type ActionResult = i64;
        type Error = AccountError;

        const COLLECTION: &'static str = "accounts";

        fn id(&self) -> &String {
            &self.id
        }

        fn from_create(id: String, payload: AccountCreate) -> Result<Self, AccountError> {
            Ok(Self {
                id,
                handle: payload.handle,
                balance: 0,
            })
        }

        fn unique_key(&self) -> Option<String> {
            Some(self.handle.clone())
        }

        fn on_update(&mut self, patch: AccountPatch) -> Result<(), AccountError> {
            if let Some(handle) = patch.handle {
                self.handle = handle;
            }
            Ok(())
        }

        fn handle_action(&mut self, action: AccountAction) -> Result<i64, AccountError> {
            match action {
                AccountAction::Deposit(amount) => self.balance += amount,
                AccountAction::Withdraw(amount) => {
                    // mutate first so the test proves a failed action is not committed
                    self.balance -= amount;
                    if self.balance < 0 {
                        return Err(AccountError::Overdrawn(-self.balance));
                    }
                }
            }
            Ok(self.balance)
        }
    }

    fn start() -> ResourceClient<Account> {
        let counter = Arc::new(AtomicU64::new(1));
        let next_id = move || format!("account_{}", counter.fetch_add(1, AtomicOrdering::SeqCst));
        let (actor, client) = ResourceActor::new(10, next_id);
        tokio::spawn(actor.run());
        client
    }

    async fn open(client: &ResourceClient<Account>, handle: &str) -> Account {
        client
            .create(AccountCreate { handle: handle.into() })
            .await
            .unwrap()
    }

    // --- Tests ---

    #[tokio::test]
    async fn test_resource_actor_with_actions() {
        let client = start();
        let account = open(&client, "alice").await;

        let balance = client
            .perform_action(account.id.clone(), AccountAction::Deposit(50))
            .await
            .unwrap();
        assert_eq!(balance, 50);

        let stored = client.get(account.id.clone()).await.unwrap().unwrap();
        assert_eq!(stored.balance, 50);
    }

    #[tokio::test]
    async fn test_failed_action_is_not_committed() {
        let client = start();
        let account = open(&client, "bob").await;
        client
            .perform_action(account.id.clone(), AccountAction::Deposit(10))
            .await
            .unwrap();

        let err = client
            .perform_action(account.id.clone(), AccountAction::Withdraw(30))
            .await
            .unwrap_err();
        assert_eq!(err, FrameworkError::Entity(AccountError::Overdrawn(20)));

        let stored = client.get(account.id).await.unwrap().unwrap();
        assert_eq!(stored.balance, 10);
    }

    #[tokio::test]
    async fn test_find_keeps_insertion_order_and_paginates() {
        let client = start();
        for handle in ["carol", "dave", "erin", "frank", "grace"] {
            open(&client, handle).await;
        }

        let page: Vec<String> = client
            .find(Query::all().skip(1).limit(2))
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.handle)
            .collect();
        assert_eq!(page, vec!["dave", "erin"]);

        let with_r = Query::all().filter(|a: &Account| a.handle.contains('r'));
        assert_eq!(client.count(with_r).await.unwrap(), 4);

        let sorted: Vec<String> = client
            .find(Query::all().sort_by(|a: &Account, b: &Account| b.handle.cmp(&a.handle)).limit(1))
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.handle)
            .collect();
        assert_eq!(sorted, vec!["grace"]);
    }

    #[tokio::test]
    async fn test_unique_key_is_enforced_on_create_and_update() {
        let client = start();
        open(&client, "heidi").await;
        let ivan = open(&client, "ivan").await;

        let err = client
            .create(AccountCreate { handle: "heidi".into() })
            .await
            .unwrap_err();
        assert_eq!(err, FrameworkError::DuplicateKey("heidi".into()));

        let err = client
            .update(ivan.id.clone(), AccountPatch { handle: Some("heidi".into()) })
            .await
            .unwrap_err();
        assert_eq!(err, FrameworkError::DuplicateKey("heidi".into()));

        // re-saving its own key is fine
        let same = client
            .update(ivan.id, AccountPatch { handle: Some("ivan".into()) })
            .await
            .unwrap();
        assert_eq!(same.handle, "ivan");
    }

    #[tokio::test]
    async fn test_delete_unknown_id() {
        let client = start();
        let account = open(&client, "judy").await;

        let removed = client.delete(account.id.clone()).await.unwrap();
        assert_eq!(removed.handle, "judy");

        let err = client.delete(account.id.clone()).await.unwrap_err();
        assert_eq!(err, FrameworkError::NotFound(account.id));
    }
}
