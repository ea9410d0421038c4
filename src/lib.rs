//! hashcons-arena: A paged arena for fixed-size binary entries with
//! stable integer handles and optional hash-consing.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: hold huge volumes of same-shaped word records compactly,
//!   append them cheaply, and optionally canonicalize them so equal
//!   content is stored once and shared by handle everywhere.
//! - Layers:
//!   - EntryStore: paged storage of fixed-size word entries. Pages are
//!     allocated lazily and never move, so handles and borrowed entry
//!     views stay valid across growth; only an explicit shrink releases
//!     pages from the tail.
//!   - HashIndex: optional attachment that maps entry content to its
//!     handle with amortized O(1) insert. Prime-sized bucket table plus
//!     a per-handle chain array; grows by full rebuild at the next
//!     prime, which never reassigns handles.
//!
//! Constraints
//! - Handles are dense, zero-based, and assigned monotonically; equal
//!   content inserted twice through the index yields the same handle.
//! - Entries are fixed-size and never individually freed; shrink only
//!   truncates from the tail.
//! - Single writer: mutation takes `&mut self`, reads take `&self`, so
//!   the borrow checker serializes writers against readers and against
//!   in-flight entry views. There is no interior mutability and no
//!   locking; multi-writer use wants an external lock held across each
//!   operation sequence that must stay atomic (notably `insert`).
//! - The index never owns entry bytes. It reads entries through the
//!   store and holds handles by value only.
//!
//! Why this split?
//! - The store is usable standalone as a plain handle-addressed arena.
//! - Index growth (rebuild) and store growth (page append) have very
//!   different invariants; keeping them in separate types keeps each
//!   one's contract small.
//!
//! Notes and non-goals
//! - Not a general dynamic container and not a persistent store; there
//!   is no per-entry free and no serialization.
//! - Raw mutation while an index is attached (overwriting through
//!   `write`/`get_or_extend`, appending through `push`, shrinking) is
//!   the caller's responsibility to sequence: detach first or re-attach
//!   after. The index does not watch raw mutations, and its chains only
//!   cover entries it saw through `insert` or at attach time.
//! - The hash policy is selected once at attach time; see
//!   [`HashStrategy`].

mod entry_store;
mod error;
mod hash_index;
mod hashing;
mod store_proptest;

// Public surface
pub use entry_store::{EntryStore, Handle, Iter, Word};
pub use error::StoreError;
pub use hash_index::{HashIndex, IndexStats};
pub use hashing::HashStrategy;
