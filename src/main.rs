use inkhex::app::AppModel;
use inkhex::config;
use inkhex::sys::clipboard::StdoutSink;
use inkhex::sys::runtime;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = config::load_or_default();
    let app = AppModel::new(config, Box::new(StdoutSink::stdout()));

    let (tx, rx) = async_channel::bounded(32);

    // Start Background Services
    runtime::start_background_services(tx)?;

    app.run(rx);
    Ok(())
}
