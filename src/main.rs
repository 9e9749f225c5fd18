use munin_plugin::plugin::builtin::LoadPlugin;

fn main() {
    munin_plugin::run_from_env::<LoadPlugin>();
}
