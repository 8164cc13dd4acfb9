//! Wire codec for the newline-delimited JSON RPC protocol.
//!
//! Every message is one JSON object followed by a single `\n`. Requests
//! travel from client to server:
//!
//! ```json
//! {"id":"1","tool":"tools.list","args":{}}
//! ```
//!
//! and each one is answered by exactly one response carrying the same id:
//!
//! ```json
//! {"id":"1","ok":true,"result":{"tools":[]}}
//! {"id":"2","ok":false,"error":"unknown operation 'bogus'"}
//! ```
//!
//! Decoding is pure. The [`LineReader`] and [`EnvelopeWriter`] adapters
//! handle framing over any `BufRead`/`Write` pair. The reader enforces a
//! maximum line length, so a misbehaving peer cannot make it allocate
//! without bound.

mod codec;
mod envelope;
mod error;
mod reader;
mod writer;

pub use codec::{decode_request, decode_response, encode, recover_request_id};
pub use envelope::{Arguments, Request, RequestId, Response, ResponseBody};
pub use error::{ArgumentError, CodecError};
pub use reader::LineReader;
pub use writer::EnvelopeWriter;
