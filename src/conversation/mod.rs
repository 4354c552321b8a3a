//! Conversation views and their in-memory store.
//!
//! Each open chat widget owns one [`ConversationView`]: the ordered message
//! list, the backend session id and the typing indicator. Views are shared
//! between request handlers through a [`ViewHandle`] and looked up by id in
//! the [`ViewStore`].
//!
//! # Example
//!
//! ```rust
//! use knowledge_chat::conversation::ViewStore;
//!
//! # async fn example() {
//! let store = ViewStore::default();
//! let view = store.create();
//! let turn = view.begin("Hello!").await.expect("non-blank text starts a turn");
//! assert_eq!(turn.request().message, "Hello!");
//! assert!(view.inspect(|v| v.is_typing()).await);
//! # }
//! ```

mod store;
mod view;

pub use store::ViewStore;
pub use view::{ConversationView, PendingTurn, ViewHandle};
