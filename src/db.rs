use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};

/// Shared r2d2 Postgres pool. Each Diesel repository holds a clone of the
/// pool and checks out a connection per call, always from a blocking
/// context (`web::block` in the handlers, `spawn_blocking` in the async
/// services), never on the async executor itself.
pub type DbPool = Pool<ConnectionManager<PgConnection>>;

/// Builds the pool at startup; a database that is unreachable at boot is
/// fatal rather than something to limp along without.
pub fn create_pool(database_url: &str) -> DbPool {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    Pool::builder()
        .build(manager)
        .expect("Failed to create database connection pool")
}
