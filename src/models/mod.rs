pub mod catalog;
pub mod display;
pub mod owned;
pub mod session;

pub use catalog::{CatalogMovie, CatalogPage, MovieDetails};
pub use display::{DisplayMovie, OwnershipStatus, WatchedFilter};
pub use owned::{MovieForm, NewOwnedMovie, OwnedMovie, OwnedMovieChanges};
pub use session::{Session, SessionContext, SignInForm, SignUpForm, User};
