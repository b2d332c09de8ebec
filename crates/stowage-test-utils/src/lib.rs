//! stowage-test-utils: Test infrastructure for stowage.
//!
//! Provides:
//! - FakeAuthority: Authoritative inventory that answers change requests
//! - MockLink: In-memory message link between a client and an authority

mod fake_authority;
mod mock_link;

pub use fake_authority::FakeAuthority;
pub use mock_link::{AuthorityLink, ClientLink, mock_link_pair};
