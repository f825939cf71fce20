fn main() {
    pveqc::app::cli::run();
}
