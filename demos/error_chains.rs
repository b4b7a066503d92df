//! Attribute resolution, identity checks and joined errors.
//!
//! Run with `cargo run --example error_chains`.

use faultline::{Error, ErrorBuilder, Resource, wrapf};

#[derive(Debug, PartialEq, thiserror::Error)]
#[error("row not found")]
struct RowNotFound;

fn query(id: u32) -> Error {
    faultline::reason("NOT_FOUND")
        .domain("storage")
        .resource(Resource {
            kind: "sql table".to_owned(),
            name: "orders".to_owned(),
            ..Resource::default()
        })
        .with_metadata("id", id.to_string())
        .wrap(RowNotFound)
}

fn load_order(id: u32) -> Error {
    wrapf!(query(id), "loading order {id}")
}

fn load_batch(ids: &[u32]) -> Option<Error> {
    ErrorBuilder::new()
        .with_tag("batch")
        .join(ids.iter().map(|&id| load_order(id)))
}

fn main() {
    let error = load_order(7);
    println!("{error}");
    println!("reason resolved from the innermost error: {:?}", error.reason());
    println!("is RowNotFound: {}", error.is(&RowNotFound));
    println!("\n{}", error.stack_trace());
    println!("\n{}", error.sources());

    if let Some(batch) = load_batch(&[1, 2, 3]) {
        println!("\n{batch}");
        println!("chain depth {}", batch.chain().count());
    }
    assert!(load_batch(&[]).is_none());
}
