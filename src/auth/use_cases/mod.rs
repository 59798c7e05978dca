pub mod login;
pub mod refresh;
pub mod register;

pub use login::{LoginUseCase, LoginUseCaseImpl};
pub use refresh::{RefreshUseCase, RefreshUseCaseImpl};
pub use register::{RegisterUseCase, RegisterUseCaseImpl};
