use crate::cli::GenotypeArgs;
use crate::mhgt::{
    marker::{stream_markers_into_channel, Marker},
    reads::AlignmentSource,
    typing::{AcceptAll, MaxMismatches, ReadFilter},
    workflows::{analyze, MarkerResult, Params},
    writers::{DepthWriter, GenotypeWriter},
};
use crate::utils::{create_writer, get_sample_name, Result};
use crossbeam_channel::{bounded, Sender};
use rayon::{
    iter::{ParallelBridge, ParallelIterator},
    ThreadPoolBuilder,
};
use std::{cell::RefCell, collections::BTreeMap, path::PathBuf, sync::Arc, thread};

#[derive(Debug, Clone)]
struct ThreadContextParams {
    reads_path: PathBuf,
}

thread_local! {
    static CTX_PARAMS: RefCell<Option<ThreadContextParams>> = const { RefCell::new(None) };
}

fn create_thread_local_source() -> AlignmentSource {
    let path = CTX_PARAMS.with(|ctx_cell| {
        ctx_cell
            .borrow()
            .as_ref()
            .expect("Thread context parameters not initialized for alignment path")
            .reads_path
            .clone()
    });
    AlignmentSource::open(&path)
        .unwrap_or_else(|e| panic!("Failed to initialize alignment reader: {}", e))
}

thread_local! {
    static THREAD_SOURCE: RefCell<AlignmentSource> = RefCell::new(create_thread_local_source());
}

const CHANNEL_BUFFER_SIZE: usize = 2048;

type IndexedResult = (usize, Option<MarkerResult>);

pub fn genotype(args: GenotypeArgs) -> Result<()> {
    // Workers reopen this path and expect it to be readable
    AlignmentSource::open(&args.reads_path)?;

    let sample_name = match args.sample_name {
        Some(name) => name,
        None => get_sample_name(&args.reads_path)?,
    };
    log::info!("Genotyping sample {}", sample_name);

    let genotype_writer = create_writer(&args.output_prefix, "tab", |path| {
        GenotypeWriter::new(path, &sample_name)
    })?;
    let depth_writer = create_writer(&args.output_prefix, "depth.tab", DepthWriter::new)?;

    let (sender_marker, receiver_marker) = bounded(CHANNEL_BUFFER_SIZE);
    let markers_path = args.markers_path.clone();
    let marker_stream_thread =
        thread::spawn(move || stream_markers_into_channel(&markers_path, sender_marker));

    let (sender_result, receiver_result) = bounded::<IndexedResult>(CHANNEL_BUFFER_SIZE);
    let writer_thread = thread::spawn(move || -> Result<usize> {
        let mut genotype_writer = genotype_writer;
        let mut depth_writer = depth_writer;
        let mut num_written = 0;
        let mut write = |result: &MarkerResult| -> Result<()> {
            genotype_writer.write(result)?;
            depth_writer.write(result)?;
            num_written += 1;
            Ok(())
        };

        // Results arrive in completion order and are written in definition order
        let mut pending = BTreeMap::new();
        let mut next_index = 0;
        for (index, result) in &receiver_result {
            pending.insert(index, result);
            while let Some(result) = pending.remove(&next_index) {
                if let Some(result) = result {
                    write(&result)?;
                }
                next_index += 1;
            }
        }
        for result in pending.into_values().flatten() {
            write(&result)?;
        }

        genotype_writer.finish()?;
        depth_writer.finish()?;
        Ok(num_written)
    });

    let read_filter: Box<dyn ReadFilter> = match args.max_mismatches {
        Some(max_nm) => Box::new(MaxMismatches(max_nm)),
        None => Box::new(AcceptAll),
    };
    let workflow_params = Arc::new(Params {
        min_freq: args.min_freq,
        min_mapq: args.min_mapq,
        read_filter,
    });

    log::debug!(
        "Initializing thread pool with {} threads...",
        args.num_threads
    );

    let pool = initialize_thread_pool(
        args.num_threads,
        ThreadContextParams {
            reads_path: args.reads_path.clone(),
        },
    )?;
    pool.install(|| {
        receiver_marker
            .into_iter()
            .par_bridge()
            .for_each_with(&sender_result, |s, (index, marker)| {
                process_marker(index, marker, &workflow_params, s)
            });
    });

    // Clean-up
    drop(sender_result);
    let num_written = writer_thread.join().expect("Writer thread panicked")?;
    log::trace!("Writer thread finished");
    let num_markers = marker_stream_thread
        .join()
        .expect("Marker stream thread panicked")?;
    log::trace!("Marker stream thread finished");

    log::info!("Genotyped {} of {} markers", num_written, num_markers);
    Ok(())
}

fn process_marker(
    index: usize,
    marker: Marker,
    workflow_params: &Arc<Params>,
    sender_result: &Sender<IndexedResult>,
) {
    THREAD_SOURCE.with(|source_cell| {
        let mut source = source_cell.borrow_mut();
        let marker_id = marker.id().to_string();
        let result = match analyze(marker, workflow_params, &mut source) {
            Ok(result) => Some(result),
            Err(err) => {
                log::error!("Error analyzing marker {}: {}", marker_id, err);
                None
            }
        };
        if let Err(e) = sender_result.send((index, result)) {
            log::error!("Failed to send marker result to writer thread: {}", e);
        }
    });
}

fn initialize_thread_pool(
    num_threads: usize,
    thread_context: ThreadContextParams,
) -> Result<rayon::ThreadPool> {
    ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .thread_name(|i| format!("mhgt-{}", i))
        .start_handler(move |_thread_index| {
            CTX_PARAMS.with(|cell| {
                *cell.borrow_mut() = Some(thread_context.clone());
            });
            log::trace!("Initialized thread {:?}", std::thread::current().id());
        })
        .exit_handler(|_thread_index| {
            CTX_PARAMS.with(|cell| {
                *cell.borrow_mut() = None;
            });
        })
        .build()
        .map_err(|e| format!("Failed to initialize thread pool: {}", e))
}
