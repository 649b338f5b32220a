use crate::AppError;

#[derive(Clone, Debug, clap::Args)]
#[clap(name = "normalize", about = "Print the canonical form of a handle")]
pub struct Normalize {
    #[clap(help = "Raw handle as a user would type it")]
    input: String,
}

impl Normalize {
    pub fn run(&self) -> Result<(), AppError> {
        println!("{}", hero_cards::normalize(&self.input));
        Ok(())
    }
}
