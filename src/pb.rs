use indicatif::{ProgressBar,ProgressStyle};

pub fn simple_pb(total_work: u64, label: &str) -> ProgressBar {
    let pb = ProgressBar::new(total_work);
    pb.set_style(ProgressStyle::default_bar()
        .template("{msg} [{elapsed_precise}] {wide_bar} ({per_sec}) {pos:>7}/{len:7} {eta_precise}"));
    pb.set_message(label);
    pb.enable_steady_tick(200);
    pb.set_draw_delta(total_work / 1000);
    pb
}
