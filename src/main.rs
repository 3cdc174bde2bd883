fn main() {
    crash_hotspots::cli::run();
}
