use rand::{SeedableRng, rngs::StdRng};
use sincflow::audio::signal::{add_noise, peak, sine, zero_crossings};
use sincflow::audio::{AudioFrame, FilterChain};
use sincflow::common::{AnyResult, logger};
use sincflow::configs::Config;
use tracing::{info, warn};

fn main() -> AnyResult<()> {
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Using built-in defaults: {}", e);
            Config::default()
        }
    };
    logger::init(&config)?;

    info!(
        "sincflow {} starting (quality={:?}, factors {}..={})",
        env!("CARGO_PKG_VERSION"),
        config.resampler.quality,
        config.resampler.min_factor,
        config.resampler.max_factor
    );

    let demo = &config.demo;
    let sample_rate = demo.sample_rate as f64;
    let len = (sample_rate * demo.duration_ms as f64 / 1_000.0) as usize;
    let mut signal = sine(demo.frequency, sample_rate, len, 0.8);
    add_noise(&mut StdRng::seed_from_u64(0x5eed), &mut signal, demo.noise);

    let mut chain = FilterChain::from_config(&config.resampler, demo.factor)?;
    if !chain.is_active() {
        warn!("factor is 1.0, output will equal input");
    }

    let frame_size = demo.frame_size.max(1);
    let mut output = Vec::with_capacity((len as f64 * demo.factor) as usize + frame_size);
    for chunk in signal.chunks(frame_size) {
        let mut frame = AudioFrame::new(chunk.to_vec());
        chain.process(&mut frame)?;
        output.extend_from_slice(&frame.samples);
    }
    output.extend(chain.finish()?);

    let out_rate = sample_rate * demo.factor;
    let seconds = output.len() as f64 / out_rate;
    let measured = zero_crossings(&output) as f64 / 2.0 / seconds;

    info!(
        input = len,
        output = output.len(),
        expected = (len as f64 * demo.factor).round() as usize,
        peak = peak(&output),
        "resampled {:.0} Hz tone from {} Hz to {:.0} Hz, measured {:.1} Hz",
        demo.frequency,
        demo.sample_rate,
        out_rate,
        measured
    );

    Ok(())
}
