fn main() {
    deckchain::app::cli::run();
}
