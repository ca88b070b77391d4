//! Response body types
//!
//! Files are streamed chunk by chunk: hyper polls the next frame only when the
//! connection can take it, so memory stays bounded no matter the file size.
//! Dropping the body (client gone) drops the open file handle with it.

use async_compression::tokio::bufread::{GzipEncoder, ZlibEncoder};
use bytes::Bytes;
use futures_util::TryStreamExt;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Empty, Full, StreamBody};
use hyper::body::Frame;
use std::io::{self, SeekFrom};
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeekExt, BufReader};
use tokio_util::io::ReaderStream;

use super::encoding::Encoding;
use super::range::ByteRange;

/// Body type shared by every response the server produces
pub type ResponseBody = UnsyncBoxBody<Bytes, io::Error>;

/// Read buffer size for file streaming
const CHUNK_SIZE: usize = 64 * 1024;

/// Body carrying an in-memory payload
pub fn full(data: impl Into<Bytes>) -> ResponseBody {
    Full::new(data.into()).map_err(|never| match never {}).boxed_unsync()
}

/// Body with no content
pub fn empty() -> ResponseBody {
    Empty::<Bytes>::new().map_err(|never| match never {}).boxed_unsync()
}

/// Stream an open file, optionally restricted to `range` and passed through `encoding`
pub async fn file_stream(
    mut file: File,
    range: Option<ByteRange>,
    encoding: Option<Encoding>,
) -> io::Result<ResponseBody> {
    let reader: Box<dyn AsyncRead + Send + Unpin> = match range {
        Some(range) => {
            file.seek(SeekFrom::Start(range.start)).await?;
            Box::new(file.take(range.len()))
        }
        None => Box::new(file),
    };

    Ok(encoded_stream(reader, encoding))
}

fn encoded_stream(
    reader: Box<dyn AsyncRead + Send + Unpin>,
    encoding: Option<Encoding>,
) -> ResponseBody {
    let buffered = BufReader::with_capacity(CHUNK_SIZE, reader);
    match encoding {
        Some(Encoding::Gzip) => reader_body(GzipEncoder::new(buffered)),
        Some(Encoding::Deflate) => reader_body(ZlibEncoder::new(buffered)),
        None => reader_body(buffered),
    }
}

fn reader_body<R>(reader: R) -> ResponseBody
where
    R: AsyncRead + Send + 'static,
{
    let stream = ReaderStream::with_capacity(reader, CHUNK_SIZE);
    StreamBody::new(stream.map_ok(Frame::data)).boxed_unsync()
}
