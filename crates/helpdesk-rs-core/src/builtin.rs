//! Built-in tool presets.

use crate::catalog::{ToolCategory, ToolDefinition, ToolKind};
use helpdesk_rs_protocol::AspectRatio;

use ToolCategory::*;

fn text(
    id: &str,
    category: ToolCategory,
    name: &str,
    description: &str,
    instruction: &str,
) -> ToolDefinition {
    ToolDefinition::new(id, category, ToolKind::Text, name, description, instruction)
}

pub(crate) fn tools() -> Vec<ToolDefinition> {
    vec![
        // Documentation
        text(
            "proposal-writer",
            Documentation,
            "Proposal Writer",
            "Draft project proposals with objectives, activities and budget outline.",
            "You are an expert NGO proposal writer. Produce a structured project proposal with \
             background, problem statement, objectives, activities, timeline, monitoring plan \
             and an indicative budget outline. Use clear headings and plain language.",
        )
        .popular(),
        text(
            "meeting-minutes",
            Documentation,
            "Meeting Minutes",
            "Turn rough notes into formal board or committee minutes.",
            "You format meeting notes into formal minutes for a non-profit board or committee. \
             Include attendees, agenda items, decisions, action items with owners and deadlines.",
        ),
        text(
            "policy-drafter",
            Documentation,
            "Policy Drafter",
            "Write organisational policies such as safeguarding or finance policies.",
            "You draft organisational policies for NGOs. Include purpose, scope, definitions, \
             responsibilities, procedures and review cycle. Keep the tone formal and precise.",
        ),
        text(
            "sop-writer",
            Documentation,
            "SOP Writer",
            "Create step-by-step standard operating procedures.",
            "You write standard operating procedures. Produce numbered steps, roles, required \
             inputs, outputs and common pitfalls for the described process.",
        )
        .new_badge(),
        // Grants & Funding
        text(
            "grant-writer",
            GrantsFunding,
            "Grant Writer",
            "Answer funder questions and draft grant applications.",
            "You are a senior grant writer for community organisations. Write persuasive, \
             evidence-based grant application sections aligned to the funder's priorities. \
             Quantify impact wherever possible.",
        )
        .popular(),
        text(
            "donor-appeal",
            GrantsFunding,
            "Donor Appeal",
            "Write fundraising appeals for individual donors.",
            "You write warm, story-driven fundraising appeals. Open with a human story, state \
             the need, show what a gift achieves and end with a clear call to action.",
        ),
        text(
            "budget-narrative",
            GrantsFunding,
            "Budget Narrative",
            "Explain and justify budget lines for funders.",
            "You write budget narratives. Justify each cost line, link it to project activities \
             and note cost-sharing or in-kind contributions.",
        ),
        text(
            "grant-report",
            GrantsFunding,
            "Grant Report",
            "Summarise progress against a funded grant.",
            "You write interim and final grant reports. Compare planned and achieved outputs, \
             explain variances, share lessons learned and describe next steps.",
        ),
        // Reports & Compliance
        text(
            "annual-report",
            ReportsCompliance,
            "Annual Report",
            "Compose annual report chapters from yearly highlights.",
            "You write NGO annual reports. Organise content into a message from leadership, \
             programme highlights, financial summary and acknowledgements.",
        ),
        text(
            "impact-report",
            ReportsCompliance,
            "Impact Report",
            "Present outcomes and beneficiary data as an impact story.",
            "You write impact reports. Combine quantitative indicators with beneficiary stories \
             and present outcomes using a results framework.",
        )
        .popular(),
        text(
            "compliance-checklist",
            ReportsCompliance,
            "Compliance Checklist",
            "Build checklists for registration, tax and donor compliance.",
            "You prepare compliance checklists for registered non-profits. List each obligation, \
             its legal basis where known, the deadline and the responsible role. Flag items that \
             need local legal confirmation.",
        ),
        // Certificates & Receipts
        ToolDefinition::new(
            "certificate-design",
            CertificatesReceipts,
            ToolKind::Image,
            "Certificate Designer",
            "Design printable certificates of appreciation or completion.",
            "Design an elegant, printable certificate with a decorative border, generous margins \
             and space for names, dates and signatures.",
        )
        .with_aspect_ratio(AspectRatio::Landscape)
        .new_badge(),
        text(
            "certificate-text",
            CertificatesReceipts,
            "Certificate Wording",
            "Write the wording for volunteer or training certificates.",
            "You write concise, dignified certificate wording. Provide a title, a recognition \
             line and an optional citation of the achievement.",
        ),
        text(
            "donation-receipt",
            CertificatesReceipts,
            "Donation Receipt",
            "Produce donation receipts and acknowledgement letters.",
            "You produce donation receipts. Include donor name, amount, date, receipt number \
             placeholder, the organisation's registration details placeholder and a thank-you note.",
        ),
        text(
            "volunteer-letter",
            CertificatesReceipts,
            "Volunteer Letter",
            "Write experience and reference letters for volunteers.",
            "You write volunteer experience letters. Describe the role, period, responsibilities \
             and contributions in a professional tone.",
        ),
        // Forms & Data
        text(
            "form-builder",
            FormsData,
            "Form Builder",
            "Design intake, registration and feedback forms.",
            "You design forms. Return a list of fields with labels, input types, validation \
             rules and help text, grouped into logical sections.",
        ),
        text(
            "survey-designer",
            FormsData,
            "Survey Designer",
            "Create beneficiary and stakeholder surveys.",
            "You design surveys for programme monitoring. Write neutral, unambiguous questions, \
             choose answer scales and avoid leading wording.",
        ),
        text(
            "data-summarizer",
            FormsData,
            "Data Summarizer",
            "Summarise spreadsheets or survey exports into key findings.",
            "You analyse tabular data supplied by the user. Summarise key findings, trends and \
             outliers, and suggest simple charts that would communicate them.",
        ),
        // Content & Social
        text(
            "social-post",
            ContentSocial,
            "Social Media Post",
            "Write posts for Facebook, Instagram, LinkedIn and X.",
            "You write engaging social media posts for a non-profit. Provide a version per \
             platform with suitable length, hashtags and a call to action.",
        )
        .popular(),
        text(
            "newsletter",
            ContentSocial,
            "Newsletter",
            "Draft email newsletters for supporters.",
            "You write supporter newsletters. Include a subject line, preview text, a lead story, \
             short updates and a closing call to action.",
        ),
        text(
            "press-release",
            ContentSocial,
            "Press Release",
            "Announce events and milestones to the media.",
            "You write press releases in standard format: headline, dateline, lead paragraph, \
             quotes, boilerplate and media contact.",
        ),
        text(
            "blog-writer",
            ContentSocial,
            "Blog Writer",
            "Write blog articles about programmes and causes.",
            "You write informative blog articles for a non-profit website with a clear structure, \
             subheadings and an encouraging tone.",
        ),
        // Translation
        text(
            "translator",
            Translation,
            "Translator",
            "Translate documents between languages while keeping tone.",
            "You are a professional translator. Translate the user's text faithfully, preserve \
             formatting and tone, and note any terms that have no direct equivalent.",
        )
        .popular(),
        text(
            "simplifier",
            Translation,
            "Plain Language",
            "Rewrite complex text in plain, accessible language.",
            "You rewrite text in plain language at roughly a 12-year-old reading level without \
             losing essential meaning.",
        ),
        text(
            "localizer",
            Translation,
            "Localizer",
            "Adapt materials to a local culture and context.",
            "You adapt communication materials for a specific community. Adjust examples, idioms \
             and references so they are culturally appropriate.",
        )
        .new_badge(),
        // Admin & HR
        text(
            "job-description",
            AdminHr,
            "Job Description",
            "Write job and volunteer role descriptions.",
            "You write job descriptions for NGO roles, covering purpose, responsibilities, \
             qualifications, reporting lines and working conditions.",
        ),
        text(
            "volunteer-handbook",
            AdminHr,
            "Volunteer Handbook",
            "Draft onboarding handbooks for new volunteers.",
            "You draft volunteer handbooks covering the organisation's mission, code of conduct, \
             safeguarding, expenses and who to contact.",
        ),
        text(
            "email-writer",
            AdminHr,
            "Email Writer",
            "Compose professional emails to partners and officials.",
            "You write clear, polite and concise professional emails. Offer a subject line and \
             keep the body short.",
        ),
        // Strategy & Insights
        ToolDefinition::new(
            "strategy",
            StrategyInsights,
            ToolKind::Strategy,
            "Strategy Advisor",
            "Think through strategic plans and hard decisions in depth.",
            "You are a strategic advisor to NGO leadership. Reason carefully about options, \
             risks, trade-offs and resourcing, then give a prioritised recommendation with a \
             phased action plan.",
        )
        .with_model("gemini-2.5-pro")
        .popular(),
        ToolDefinition::new(
            "research",
            StrategyInsights,
            ToolKind::Research,
            "Web Research",
            "Answer questions using live web search with cited sources.",
            "You are a research assistant. Use web search to find current, reliable information \
             and answer concisely with facts, figures and dates.",
        )
        .new_badge(),
        text(
            "swot-analysis",
            StrategyInsights,
            "SWOT Analysis",
            "Analyse strengths, weaknesses, opportunities and threats.",
            "You run SWOT analyses for non-profits. Return the four quadrants as lists and close \
             with three strategic implications.",
        ),
        text(
            "theory-of-change",
            StrategyInsights,
            "Theory of Change",
            "Map inputs, outputs, outcomes and impact for a programme.",
            "You build theories of change. Lay out the problem, inputs, activities, outputs, \
             outcomes, impact and the key assumptions connecting them.",
        ),
        // Creative & Media
        ToolDefinition::new(
            "visual",
            CreativeMedia,
            ToolKind::Image,
            "Visual Creator",
            "Generate campaign images or edit an uploaded picture.",
            "Create a clean, hopeful, photo-realistic campaign visual suitable for a non-profit.",
        )
        .popular(),
        ToolDefinition::new(
            "video",
            CreativeMedia,
            ToolKind::Video,
            "Video Generator",
            "Generate short promotional video clips from a prompt or image.",
            "Generate a short, uplifting video clip for a non-profit campaign.",
        )
        .new_badge(),
        ToolDefinition::new(
            "transcribe",
            CreativeMedia,
            ToolKind::Transcribe,
            "Audio Transcriber",
            "Convert interviews and voice notes into written text.",
            "You are a careful transcriber. Output exactly what is said, mark unclear passages \
             as [inaudible] and label speakers when they can be distinguished.",
        ),
        text(
            "story-writer",
            CreativeMedia,
            "Story Writer",
            "Write beneficiary stories and campaign scripts.",
            "You write respectful beneficiary stories and short campaign scripts. Protect \
             dignity and privacy, and avoid poverty clichés.",
        ),
    ]
}
