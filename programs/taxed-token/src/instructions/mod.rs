// Handler names are unique so the glob re-exports below stay unambiguous.
#![deny(ambiguous_glob_reexports)]

pub mod initialize;
pub mod mint;
pub mod ownership;
pub mod pause;
pub mod policy;
pub mod seize;
pub mod taxes;
pub mod transfer;

pub use initialize::*;
pub use mint::*;
pub use ownership::*;
pub use pause::*;
pub use policy::*;
pub use seize::*;
pub use taxes::*;
pub use transfer::*;
