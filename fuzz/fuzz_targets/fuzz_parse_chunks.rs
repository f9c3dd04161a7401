#![no_main]

use libfuzzer_sys::fuzz_target;
use vadpcm_stats::aiff::write_chunks;
use vadpcm_stats::{decode_codebook, decode_predictors, extract_compressed_frames, parse_chunks};

fuzz_target!(|data: &[u8]| {
    let Ok(chunks) = parse_chunks(data) else {
        return;
    };
    // Every accepted chunk re-serializes to its own encoded length.
    let encoded = write_chunks(&chunks);
    assert_eq!(
        encoded.len(),
        chunks.iter().map(|c| c.encoded_len()).sum::<usize>()
    );
    let _ = decode_codebook(&chunks);
    if let Ok(frames) = extract_compressed_frames(&chunks, 9) {
        assert_eq!(decode_predictors(&frames).len(), frames.frame_count());
    }
});
