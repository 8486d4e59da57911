pub mod resolve_host;
pub mod update_servers;

pub use resolve_host::ResolveHostUseCase;
pub use update_servers::UpdateServersUseCase;
