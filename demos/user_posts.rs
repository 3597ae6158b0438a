//! User Posts
//!
//! This example loads a user and then their posts from two slow services,
//! and validates the request that started it all.
//!
//! Key concepts:
//! - Synchronous validation with `zip`, `traverse` and `fold`
//! - Chaining pending computations with `flat_map_async`
//! - Timeouts and recovery without blocking
//! - Blocking extraction only at the very end
//!
//! Run with: cargo run --example user_posts

use std::thread;
use std::time::Duration;
use thiserror::Error;
use vessel::deferred::{promise, Deferred};
use vessel::{traverse, zip, AsyncVessel, CombineFailure, Vessel, WaitError};

#[derive(Debug, Error)]
enum AppError {
    #[error("invalid user id {0:?}")]
    InvalidId(String),
    #[error("user {0} not found")]
    UserNotFound(u32),
    #[error("post service timed out")]
    PostsTimedOut,
    #[error("request rejected: {0}")]
    Request(#[from] CombineFailure),
    #[error(transparent)]
    Wait(#[from] WaitError),
}

#[derive(Debug, Clone)]
struct User {
    id: u32,
    name: String,
}

fn parse_id(raw: &str) -> Vessel<u32, AppError> {
    Vessel::lift(|| raw.trim().parse::<u32>()).map_error(|_| AppError::InvalidId(raw.to_string()))
}

fn page_size(raw: &str) -> Vessel<usize, AppError> {
    Vessel::lift(|| raw.parse::<usize>())
        .map_error(|_| AppError::InvalidId(raw.to_string()))
        .filter(|size| *size > 0, || AppError::InvalidId(raw.to_string()))
}

/// Completes on a worker thread after `delay`, like a remote call would.
fn remote<T: Send + 'static>(delay: Duration, response: Result<T, AppError>) -> Deferred<T, AppError> {
    let (producer, handle) = promise();
    thread::spawn(move || {
        thread::sleep(delay);
        match response {
            Ok(value) => producer.complete(value),
            Err(err) => producer.fail(err),
        }
    });
    handle
}

fn fetch_user(id: u32) -> Deferred<User, AppError> {
    let response = match id {
        1 => Ok(User {
            id,
            name: "ada".to_string(),
        }),
        2 => Ok(User {
            id,
            name: "grace".to_string(),
        }),
        _ => Err(AppError::UserNotFound(id)),
    };
    remote(Duration::from_millis(20), response)
}

fn fetch_posts(user: User) -> Deferred<Vec<String>, AppError> {
    let delay = if user.id == 2 { 500 } else { 20 };
    let posts = (1..=3).map(|n| format!("{} post #{n}", user.name)).collect();
    remote(Duration::from_millis(delay), Ok(posts))
}

fn posts_for(id: u32, limit: usize) -> AsyncVessel<Vec<String>, AppError> {
    AsyncVessel::lift(|| fetch_user(id))
        .flat_map_async(fetch_posts)
        .with_timeout(Duration::from_millis(100), || AppError::PostsTimedOut)
        .recover_with(|err| match err {
            AppError::PostsTimedOut => AsyncVessel::success(vec!["(posts unavailable)".into()]),
            other => AsyncVessel::failure(other),
        })
        .map_async(move |posts| posts.into_iter().take(limit).collect())
}

fn main() {
    println!("=== User Posts ===\n");

    // Validate both request parameters together
    let requests = [("1", "2"), ("abc", "0"), ("2", "5"), ("9", "1")];

    for (raw_id, raw_size) in requests {
        println!("Request id={raw_id:?} size={raw_size:?}");

        let request = zip(parse_id(raw_id), page_size(raw_size), |id, size| (id, size));
        let (id, size) = match request {
            Vessel::Success(request) => request,
            Vessel::Failure(err) => {
                println!("  rejected: {err}\n");
                continue;
            }
        };

        let summary = posts_for(id, size)
            .to_result()
            .fold(|posts| posts.join(", "), |err| format!("failed: {err}"));
        println!("  {summary}\n");
    }

    // Batch validation stops at the first bad id
    let ids = traverse(["1", "2", "x", "4"], parse_id);
    println!(
        "Batch ids: {}",
        ids.fold(|ids| format!("{ids:?}"), |err| err.to_string())
    );
}
