use kaiwa_config::Config;

/// Strategy for initializing the configuration.
///
/// Creates the template configuration file at `~/kaiwa/config.json`.
#[derive(Debug, Clone, Copy)]
pub struct InitStrategy;

impl super::CommandStrategy for InitStrategy {
    type Input = ();

    async fn execute(&self, _input: Self::Input) -> anyhow::Result<()> {
        let path = Config::create_config()?;
        println!("Config ready at {}", path.display());
        Ok(())
    }
}
