// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The one error type every fallible call in this crate returns.

use failure::Fail;
use std::io;

/// Everything that can go wrong between asking for an image and
/// getting one written to disk.  Rendering itself is pure arithmetic,
/// so nothing here is transient and nothing is retried.
#[derive(Debug, Fail)]
pub enum RenderError {
    /// The caller asked for something we refuse to start on: a
    /// non-positive or overflowing image size, zero workers, an empty
    /// iteration budget, or an inverted viewport.
    #[fail(display = "invalid input: {}", _0)]
    InvalidInput(String),

    /// The image buffer could not be allocated.
    #[fail(display = "could not allocate {} bytes for the image buffer", bytes)]
    ResourceExhaustion {
        /// How much we asked for.
        bytes: usize,
    },

    /// The operating system refused to start another render thread.
    /// Threads that did start have been joined before this is returned.
    #[fail(display = "could not start a render thread after {} started: {}", spawned, cause)]
    SpawnFailure {
        /// How many threads were running when the spawn failed.
        spawned: usize,
        /// Why the spawn failed.
        #[fail(cause)]
        cause: io::Error,
    },

    /// The encoder could not write the finished image.
    #[fail(display = "could not write {}: {}", path, cause)]
    EncodingFailure {
        /// The destination we were writing to.
        path: String,
        /// What the filesystem or encoder had to say about it.
        #[fail(cause)]
        cause: io::Error,
    },

    /// The render was cancelled before every row was drawn.
    #[fail(display = "render cancelled")]
    Cancelled,

    /// A worker thread panicked; the image cannot be trusted.
    #[fail(display = "a render worker panicked")]
    WorkerPanicked,
}

impl RenderError {
    pub(crate) fn invalid<S: Into<String>>(message: S) -> Self {
        RenderError::InvalidInput(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_problem() {
        let e = RenderError::invalid("width must be positive");
        assert_eq!(e.to_string(), "invalid input: width must be positive");

        let e = RenderError::ResourceExhaustion { bytes: 64 };
        assert_eq!(
            e.to_string(),
            "could not allocate 64 bytes for the image buffer"
        );
    }

    #[test]
    fn spawn_failure_says_how_far_it_got() {
        let e = RenderError::SpawnFailure {
            spawned: 3,
            cause: io::Error::new(io::ErrorKind::Other, "out of threads"),
        };
        assert_eq!(
            e.to_string(),
            "could not start a render thread after 3 started: out of threads"
        );
        assert!(e.cause().is_some());
    }

    #[test]
    fn encoding_failure_keeps_its_cause() {
        let e = RenderError::EncodingFailure {
            path: "/nowhere/out.png".to_string(),
            cause: io::Error::new(io::ErrorKind::NotFound, "no such directory"),
        };
        assert!(e.to_string().starts_with("could not write /nowhere/out.png"));
        assert!(e.cause().is_some());
    }
}
