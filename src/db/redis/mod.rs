pub mod session_store;

pub use session_store::create_redis_client;
pub use session_store::RedisSessionStore;
