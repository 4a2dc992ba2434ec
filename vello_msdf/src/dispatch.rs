// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Distribution of independent row work over a thread pool.

use core::num::NonZeroUsize;

/// Calls `op` for every row of `buf`, which holds rows of `width` elements.
///
/// Each worker creates its own state with `init` and reuses it for all the rows it
/// processes. `op` receives the state, the row index and the row itself. Rows run in
/// parallel unless `num_threads` is one or the `multithreading` feature is disabled.
pub(crate) fn for_each_row<T, S, I, F>(
    buf: &mut [T],
    width: usize,
    num_threads: Option<NonZeroUsize>,
    init: I,
    op: F,
) where
    T: Send,
    I: Fn() -> S + Sync + Send,
    F: Fn(&mut S, usize, &mut [T]) + Sync + Send,
{
    if width == 0 || buf.is_empty() {
        return;
    }

    #[cfg(feature = "multithreading")]
    if num_threads.is_none_or(|n| n.get() > 1) {
        use rayon::ThreadPoolBuilder;
        use rayon::prelude::*;

        let mut builder = ThreadPoolBuilder::new();
        if let Some(n) = num_threads {
            builder = builder.num_threads(n.get());
        }
        match builder.build() {
            Ok(thread_pool) => {
                thread_pool.install(|| {
                    buf.par_chunks_mut(width)
                        .enumerate()
                        .for_each_init(&init, |state, (y, row)| op(state, y, row));
                });
                return;
            }
            Err(e) => {
                log::warn!("Failed to build a thread pool, running on the calling thread: {e}");
            }
        }
    }
    #[cfg(not(feature = "multithreading"))]
    let _ = num_threads;

    let mut state = init();
    for (y, row) in buf.chunks_mut(width).enumerate() {
        op(&mut state, y, row);
    }
}
