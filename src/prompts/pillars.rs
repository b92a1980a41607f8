//! Static domain briefs for the fourteen assessment pillars.

/// Research guidance for one pillar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PillarBrief {
    pub id: i64,
    pub name: &'static str,
    pub focus: &'static str,
    pub key_evidence: &'static str,
    pub red_flags: &'static str,
    pub trusted_sources: &'static str,
}

impl PillarBrief {
    /// Multi-line block embedded in question and pillar prompts.
    pub fn to_context(&self) -> String {
        format!(
            "Focus: {}\nKey Evidence: {}\nRed Flags: {}\nTrustworthy Sources: {}",
            self.focus, self.key_evidence, self.red_flags, self.trusted_sources
        )
    }
}

pub const PILLAR_COUNT: i64 = 14;

static PILLARS: [PillarBrief; PILLAR_COUNT as usize] = [
    PillarBrief {
        id: 1,
        name: "Sanitation & Waste",
        focus: "Solid and liquid waste handling, hygiene, public cleanliness, sanitation governance",
        key_evidence: "Collection coverage, sewer connections, treatment capacity, recycling rates, service mapping by district",
        red_flags: "Clean centre with neglected informal areas, treatment volumes never published, coverage gaps",
        trusted_sources: "WHO/UNICEF Joint Monitoring Programme, UN-Habitat, municipal sanitation utilities",
    },
    PillarBrief {
        id: 2,
        name: "Digital Readiness",
        focus: "Connectivity, e-government services, municipal data systems, digital inclusion, cyber resilience",
        key_evidence: "Broadband penetration, online service uptake, open data portals, data protection enforcement",
        red_flags: "Smart-city branding without metrics, digital divides by income or district, vendor-authored claims",
        trusted_sources: "ITU, telecom regulators, municipal ICT departments",
    },
    PillarBrief {
        id: 3,
        name: "Peace & Conflict Prevention",
        focus: "Drivers of tension, protest dynamics, hate speech, early warning, mediation capacity",
        key_evidence: "Police incident statistics, protest and clash records, grievance registers, land dispute caseloads",
        red_flags: "Claims of zero incidents in tense settings, under-reporting, recurring service-delivery protests",
        trusted_sources: "ACLED, UNDP fragility assessments, police records",
    },
    PillarBrief {
        id: 4,
        name: "Basic Services & Mobility",
        focus: "Water, power, transport and ICT networks, reliability, equitable access, maintenance",
        key_evidence: "Connection rates, outage logs, tariffs, route coverage, ridership and road safety data",
        red_flags: "Network exists but is unusable, thin maintenance budgets, informal transport left out of planning",
        trusted_sources: "UN-Habitat, utility operators, transport authorities, World Bank",
    },
    PillarBrief {
        id: 5,
        name: "Green & Natural Spaces",
        focus: "Urban forests, parks, biodiversity, nature-based solutions, fair access to green space",
        key_evidence: "Park inventory and location, tree counts, canopy cover, protected areas",
        red_flags: "Green access tracking income, unverified planting drives, displacement through beautification",
        trusted_sources: "UNEP, FAO, Global Forest Watch, parks departments",
    },
    PillarBrief {
        id: 6,
        name: "Culture & Heritage",
        focus: "Heritage protection, inclusive collective memory, symbolic representation, creative economy",
        key_evidence: "Protected site registers, cultural budgets, naming decisions, creative sector data",
        red_flags: "Erased narratives, regeneration displacing residents, minorities absent from public symbols",
        trusted_sources: "UNESCO, ICOMOS, culture ministries, urban memory research",
    },
    PillarBrief {
        id: 7,
        name: "Land & Housing",
        focus: "Tenure security, affordability, evictions, women's land rights, spatial justice",
        key_evidence: "Land registries, titling, zoning maps, eviction records, public housing stock",
        red_flags: "Forced evictions or mass demolitions, gender-blind data, informality framed as illegality",
        trusted_sources: "UN-Habitat, World Bank Land Governance Assessment, cadastral records",
    },
    PillarBrief {
        id: 8,
        name: "Health & Wellbeing",
        focus: "Healthcare access, mental health, disability inclusion, food security, social protection",
        key_evidence: "Facility locations and staffing, service coverage, mortality data, insurance enrolment",
        red_flags: "City averages hiding disparities, little mental health or disability data, neglected settlements",
        trusted_sources: "WHO Global Health Observatory, UNICEF, health ministries",
    },
    PillarBrief {
        id: 9,
        name: "Environmental Risk & Resilience",
        focus: "Climate and disaster risk, hazard exposure, built environment safety, environmental health",
        key_evidence: "Hazard maps, disaster loss records, flood and heat events, air and water quality",
        red_flags: "Hazard maps that stop at the periphery, no adaptation despite clear projections",
        trusted_sources: "IPCC, UNDRR, EM-DAT, WHO environmental health data",
    },
    PillarBrief {
        id: 10,
        name: "Social Cohesion",
        focus: "Trust, solidarity networks, civic participation, inclusion, community resilience",
        key_evidence: "Turnout, participatory budgeting, neighbourhood associations, social survey results",
        red_flags: "High reported trust in brittle contexts, civil society absent under restrictive rule",
        trusted_sources: "Afrobarometer, Latinobarometro, UNDP social cohesion studies",
    },
    PillarBrief {
        id: 11,
        name: "Business Environment",
        focus: "Ease of starting and running a business, property rights, dispute resolution, access to capital",
        key_evidence: "Registration and licensing data, commercial court performance, credit access",
        red_flags: "Statistics contradicted by informal markets, hostile regulation, weak property enforcement",
        trusted_sources: "World Bank Enterprise Surveys, business registration agencies",
    },
    PillarBrief {
        id: 12,
        name: "Jobs & Livelihoods",
        focus: "Job creation, decent work, skills, labour rights, inclusion of marginalised workers",
        key_evidence: "Labour force surveys, employment services, vocational training, local hiring clauses",
        red_flags: "Underemployment ignored, megaprojects without skills plans, weak labour inspection",
        trusted_sources: "ILO, labour ministries, World Bank jobs diagnostics",
    },
    PillarBrief {
        id: 13,
        name: "Governance & Integrity",
        focus: "Transparency, participation, accountability, ethics, institutional capacity",
        key_evidence: "Published budgets, procurement records, audit findings, ombudsman caseloads",
        red_flags: "Oversight data missing, zero complaints recorded, unverified claims of perfect integrity",
        trusted_sources: "City auditor reports, Transparency International, World Justice Project",
    },
    PillarBrief {
        id: 14,
        name: "Education & Learning",
        focus: "Access, quality, spatial equity, digital readiness, lifelong learning",
        key_evidence: "Enrolment and completion rates, pupil-teacher ratios, school mapping, adult learning programmes",
        red_flags: "Only national figures available, public/private quality gaps, uneven school distribution",
        trusted_sources: "UNESCO Institute for Statistics, UNICEF, city education offices",
    },
];

/// Brief for `pillar_id`, if it is one of the fourteen pillars.
pub fn pillar_brief(pillar_id: i64) -> Option<&'static PillarBrief> {
    if (1..=PILLAR_COUNT).contains(&pillar_id) {
        PILLARS.get((pillar_id - 1) as usize)
    } else {
        None
    }
}

/// All pillar briefs in id order.
pub fn all_pillars() -> &'static [PillarBrief] {
    &PILLARS
}
