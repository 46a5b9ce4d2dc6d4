pub mod memory;
pub mod postgres;
pub mod redis;
pub mod session;
pub mod store;

pub use memory::{MemorySessionStore, MemoryStore};
pub use postgres::{create_pool, run_migrations, PgStore};
pub use self::redis::{create_redis_client, RedisSessionStore};
pub use session::{Flash, FlashLevel, SessionData, SessionId, SessionStore};
pub use store::{LikedMovie, Store};
