fn main() -> anyhow::Result<()> {
    pkgsift::run()
}
