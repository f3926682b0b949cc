use crate::{
    export::ExportPlan,
    types::{AnalysisResult, Track},
};

/// Format seconds as MM:SS timestamp
pub fn format_timestamp(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Library row: `Epic Orchestral  Music • 180s`
pub fn format_track_line(track: &Track) -> String {
    format!(
        "{:<20} {} • {}s",
        track.name, track.category, track.duration_secs
    )
}

pub fn format_scene_badges(result: &AnalysisResult) -> String {
    result
        .scenes
        .iter()
        .map(|scene| format!("{} {}s", scene.kind, scene.time_secs))
        .collect::<Vec<_>>()
        .join(" | ")
}

pub fn format_analysis_readable(result: &AnalysisResult) -> String {
    let mut output = String::new();
    output.push_str("## Analysis results\n\n");
    output.push_str(&format!(
        "**Emotion:** {} | **Tempo:** {} BPM\n\n",
        result.emotion, result.tempo_bpm
    ));
    output.push_str(&format!("**Scenes ({}):** ", result.scenes.len()));
    output.push_str(&format_scene_badges(result));
    output.push('\n');
    output
}

pub fn format_export_plan_readable(plan: &ExportPlan) -> String {
    let mut output = String::new();
    output.push_str(&format!("# Preview: {}\n\n", plan.video.name));

    output.push_str(&format!("## Staged tracks ({})\n\n", plan.track_count));
    for (idx, track) in plan.tracks.iter().enumerate() {
        output.push_str(&format!(
            "{}. {} ({}s, {})\n",
            idx + 1,
            track.name,
            track.duration_secs,
            track.emotion
        ));
    }
    output.push_str(&format!(
        "\n**Total audio:** {}\n",
        format_timestamp(plan.total_duration_secs)
    ));

    if let Some(analysis) = &plan.analysis {
        output.push('\n');
        output.push_str(&format_analysis_readable(analysis));
    }

    output
}
