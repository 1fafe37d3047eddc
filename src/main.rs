fn main() -> anyhow::Result<()> {
    camera_monitor_lib::run()
}
