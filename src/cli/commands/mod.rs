mod ingest;
mod init;
mod list;

pub use ingest::cmd_ingest;
pub use init::cmd_init;
pub use list::cmd_list_shows;
