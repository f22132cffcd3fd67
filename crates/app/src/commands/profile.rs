use services::AppServices;

use crate::cli::ProfileCommand;

pub async fn run(services: &AppServices, command: ProfileCommand) -> anyhow::Result<()> {
    let profiles = services.profiles();
    let profile = match command {
        ProfileCommand::Show => profiles.load().await?,
        ProfileCommand::SetName { name } => profiles.set_display_name(&name).await?,
        ProfileCommand::SetAvatar { url } => profiles.set_avatar_url(Some(url)).await?,
        ProfileCommand::ClearAvatar => profiles.set_avatar_url(None).await?,
    };

    println!("{} ({})", profile.display_name(), profile.initials());
    if let Some(url) = profile.avatar_url() {
        println!("avatar: {url}");
    }
    Ok(())
}
