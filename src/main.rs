fn main() {
    snapshotter::cli::run();
}
